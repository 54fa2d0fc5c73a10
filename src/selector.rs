//! Stateful, parallel driver that scores every candidate in a set of
//! batches against one pattern.

use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{LazyLock, Mutex};

use log::{debug, trace};
use rayon::ThreadPool;

use crate::candidate::CandidateBatch;
use crate::matcher::{Matcher, Precision};
use crate::pattern::Pattern;

static THREAD_POOL: LazyLock<ThreadPool> = LazyLock::new(|| {
    rayon::ThreadPoolBuilder::new()
        .thread_name(|i| format!("fuzzy-complete-worker-{i}"))
        .build()
        .expect("failed to build thread pool")
});

/// One scored candidate, addressed by which batch and which index inside it.
#[derive(Copy, Clone, Debug)]
pub struct CandidateBatchesMatch {
    /// Index into the batches passed to [`ScoredMatchSelector::new`].
    pub batch_index: usize,
    /// Index of the candidate within that batch.
    pub candidate_index: usize,
    /// The text-only score produced by the matcher.
    pub text_score: f64,
}

struct Slice {
    batch_index: usize,
    range: Range<usize>,
}

fn build_partitions(batches: &[CandidateBatch], workers: usize) -> Vec<Vec<Slice>> {
    let workers = workers.max(1);
    let lens: Vec<usize> = batches.iter().map(CandidateBatch::len).collect();
    let total: usize = lens.iter().sum();

    let mut prefix = vec![0usize; lens.len() + 1];
    for (i, &l) in lens.iter().enumerate() {
        prefix[i + 1] = prefix[i] + l;
    }

    if total == 0 {
        return (0..workers).map(|_| Vec::new()).collect();
    }

    let chunk = total / workers;
    let mut partitions = Vec::with_capacity(workers);
    let mut global_start = 0usize;

    for w in 0..workers {
        let global_end = if w == workers - 1 { total } else { global_start + chunk };
        let mut slices = Vec::new();
        let mut pos = global_start;
        while pos < global_end {
            let batch_index = prefix.partition_point(|&x| x <= pos).saturating_sub(1);
            let batch_end_global = prefix[batch_index + 1];
            let slice_end = global_end.min(batch_end_global);
            let local_start = pos - prefix[batch_index];
            let local_end = slice_end - prefix[batch_index];
            if local_end > local_start {
                slices.push(Slice {
                    batch_index,
                    range: local_start..local_end,
                });
            }
            pos = slice_end;
        }
        partitions.push(slices);
        global_start = global_end;
    }

    partitions
}

/// Scores every candidate across a fixed set of batches against a pattern,
/// re-using one contiguous worker partitioning across repeated calls.
pub struct ScoredMatchSelector<'a> {
    batches: &'a [CandidateBatch],
    partitions: Vec<Vec<Slice>>,
    reentry_guard: Mutex<()>,
}

impl<'a> ScoredMatchSelector<'a> {
    /// Build a selector over `batches`, partitioning work across as many
    /// workers as the host has hardware parallelism for.
    pub fn new(batches: &'a [CandidateBatch]) -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let partitions = build_partitions(batches, workers);
        debug!(
            "scored-match-selector partitioned {} candidates across {} workers",
            batches.iter().map(CandidateBatch::len).sum::<usize>(),
            partitions.len()
        );
        ScoredMatchSelector {
            batches,
            partitions,
            reentry_guard: Mutex::new(()),
        }
    }

    /// Score every candidate against `pattern` at the given precision.
    ///
    /// Calls are serialized: a concurrent call blocks until the previous one
    /// returns, rather than racing on shared scratch.
    pub fn scored_matches(
        &self,
        matcher: &Matcher,
        pattern: &Pattern,
        precision: Precision,
    ) -> Vec<CandidateBatchesMatch> {
        let _guard = self.reentry_guard.lock().expect("selector mutex poisoned");
        let batches = self.batches;
        let filter_rejected = AtomicUsize::new(0);

        let mut worker_outputs: Vec<Vec<CandidateBatchesMatch>> =
            (0..self.partitions.len()).map(|_| Vec::new()).collect();

        THREAD_POOL.scope(|scope| {
            for (output, slices) in worker_outputs.iter_mut().zip(self.partitions.iter()) {
                let filter_rejected = &filter_rejected;
                scope.spawn(move |_| {
                    let mut local = Vec::new();
                    let mut rejected = 0usize;
                    for slice in slices {
                        let batch = &batches[slice.batch_index];
                        batch.enumerate(slice.range.clone(), |candidate_index, candidate| {
                            if matcher.quick_reject(pattern, candidate) {
                                rejected += 1;
                                return;
                            }
                            if let Some(score) = matcher.match_and_score(pattern, candidate, precision) {
                                local.push(CandidateBatchesMatch {
                                    batch_index: slice.batch_index,
                                    candidate_index,
                                    text_score: score.value,
                                });
                            }
                        });
                    }
                    filter_rejected.fetch_add(rejected, Ordering::Relaxed);
                    *output = local;
                });
            }
        });

        trace!(
            "scored_matches rejected {} candidates via the rejection filter fast path",
            filter_rejected.load(Ordering::Relaxed)
        );
        worker_outputs.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::ContentType;

    fn sample_batches() -> Vec<CandidateBatch> {
        let mut a = CandidateBatch::new(64);
        a.append(b"loadData", ContentType::CodeCompletionSymbol);
        a.append(b"loadFile", ContentType::CodeCompletionSymbol);
        a.append(b"xyzxyzxyz", ContentType::CodeCompletionSymbol);
        let mut b = CandidateBatch::new(64);
        b.append(b"saveData", ContentType::CodeCompletionSymbol);
        vec![a, b]
    }

    #[test]
    fn partitions_cover_every_candidate_exactly_once() {
        let batches = sample_batches();
        for workers in [1, 2, 3, 5] {
            let partitions = build_partitions(&batches, workers);
            let mut seen = std::collections::HashSet::new();
            for slices in &partitions {
                for slice in slices {
                    for i in slice.range.clone() {
                        assert!(seen.insert((slice.batch_index, i)), "duplicate coverage");
                    }
                }
            }
            let total: usize = batches.iter().map(CandidateBatch::len).sum();
            assert_eq!(seen.len(), total);
        }
    }

    #[test]
    fn scores_every_matching_candidate() {
        let batches = sample_batches();
        let selector = ScoredMatchSelector::new(&batches);
        let matcher = Matcher::default();
        let pattern = Pattern::new("data");
        let results = selector.scored_matches(&matcher, &pattern, Precision::Fast);
        assert_eq!(results.len(), 2); // loadData, saveData
    }

    #[test]
    fn reentrant_calls_reset_between_runs() {
        let batches = sample_batches();
        let selector = ScoredMatchSelector::new(&batches);
        let matcher = Matcher::default();
        let pattern = Pattern::new("data");
        let first = selector.scored_matches(&matcher, &pattern, Precision::Fast);
        let second = selector.scored_matches(&matcher, &pattern, Precision::Fast);
        assert_eq!(first.len(), second.len());
    }
}
