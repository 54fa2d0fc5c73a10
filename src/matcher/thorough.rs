//! Budgeted backtracking search over every viable pattern/candidate
//! partitioning, used by [`Precision::Thorough`].

use std::cell::RefCell;

use log::debug;
use thread_local::ThreadLocal;

use super::score::single_score;
use super::{IndexedCandidate, MatchedRange, Precision, TextScore};
use crate::candidate::Candidate;
use crate::config::ScoringConfig;
use crate::filter::{FilterResult, RejectionFilter};
use crate::pattern::Pattern;

/// Per-thread scratch space for the backtracking stack and the in-progress
/// matched ranges, reused across calls on the same thread instead of
/// reallocating for every candidate.
#[derive(Default)]
struct Scratch {
    stack: Vec<Step>,
    matched_ranges: Vec<MatchedRange>,
}

static SCRATCH: ThreadLocal<RefCell<Scratch>> = ThreadLocal::new();

#[derive(Copy, Clone)]
enum RestoredRange {
    None,
    /// Undo: pop the range that was appended.
    Unwind,
    /// Undo: restore the range that was shrunk back to its prior bounds.
    Restore(MatchedRange),
}

#[derive(Copy, Clone)]
struct Step {
    pattern_index: usize,
    candidate_index: usize,
    restored_range: RestoredRange,
}

/// Precompute, for each candidate byte, the smallest later index that both
/// starts a token and could possibly contain the remaining pattern.
fn next_search_starts(pattern: &Pattern, indexed: &IndexedCandidate<'_>) -> Vec<usize> {
    let len = indexed.len();
    let mut starts = vec![len; len];
    let mut next_valid = len;
    for i in (0..len).rev() {
        starts[i] = next_valid;

        let addr = indexed.tokenization.byte_token_addresses[i];
        let is_token_start = addr.index_in_token == 0;
        let possibly_contains_pattern = RejectionFilter::filter_match(
            pattern.rejection_filter(),
            RejectionFilter::from_lowercase_bytes(&indexed.lowercase_bytes[i..]),
        ) != FilterResult::No;

        if is_token_start && possibly_contains_pattern {
            next_valid = i;
        }
    }
    starts
}

fn candidate_successive_filters(indexed: &IndexedCandidate<'_>) -> Vec<RejectionFilter> {
    let len = indexed.len();
    let mut filters = vec![RejectionFilter::EMPTY; len];
    let mut running = RejectionFilter::EMPTY;
    for i in (0..len).rev() {
        running = running.union_byte(indexed.lowercase_bytes[i]);
        filters[i] = running;
    }
    filters
}

/// Run the bounded backtracking search and return the best [`TextScore`]
/// (and, if `capture_ranges` is set, the ranges that produced it), or `None`
/// if the search exhausted its budget before completing a single partition
/// (the caller falls back to fast-match styles).
pub(crate) fn thorough_score(
    config: &ScoringConfig,
    pattern: &Pattern,
    candidate: Candidate<'_>,
    indexed: &IndexedCandidate<'_>,
    capture_ranges: bool,
) -> Option<(TextScore, Vec<MatchedRange>)> {
    let pattern_len = pattern.len();
    let candidate_len = indexed.len();
    if pattern_len == 0 {
        return Some((
            TextScore {
                value: 1.0,
                false_starts: 0,
            },
            Vec::new(),
        ));
    }

    let next_starts = next_search_starts(pattern, indexed);
    let candidate_successive = candidate_successive_filters(indexed);

    let scratch = SCRATCH.get_or(|| RefCell::new(Scratch::default()));
    let mut scratch = scratch.borrow_mut();
    let Scratch { stack, matched_ranges } = &mut *scratch;
    stack.clear();
    matched_ranges.clear();
    stack.push(Step {
        pattern_index: 0,
        candidate_index: indexed.first_matching_lowercase_byte_index,
        restored_range: RestoredRange::None,
    });

    let mut best: Option<TextScore> = None;
    let mut best_ranges: Vec<MatchedRange> = Vec::new();
    let mut cycles = 0u32;

    while let Some(step) = stack.pop() {
        cycles += 1;
        if cycles > config.thorough_search_budget {
            debug!(
                "thorough search exhausted its {}-cycle budget; falling back to fast-match styles",
                config.thorough_search_budget
            );
            return best.map(|b| (b, best_ranges));
        }

        match step.restored_range {
            RestoredRange::None => {}
            RestoredRange::Unwind => {
                matched_ranges.pop();
            }
            RestoredRange::Restore(prev) => {
                if let Some(last) = matched_ranges.last_mut() {
                    *last = prev;
                }
            }
        }

        let p = step.pattern_index;
        let c = step.candidate_index;
        let pattern_bytes_remaining = pattern_len - p;

        if pattern_bytes_remaining == 0 {
            if !matched_ranges.is_empty() {
                let scored = single_score(
                    config,
                    pattern,
                    candidate,
                    indexed,
                    matched_ranges,
                    Precision::Thorough,
                    None,
                );
                if best.map(|b| scored.is_better_than(b)).unwrap_or(true) {
                    best = Some(scored);
                    if capture_ranges {
                        best_ranges = matched_ranges.clone();
                    }
                }
            }
            continue;
        }

        if c >= candidate_len || candidate_len - c < pattern_bytes_remaining {
            continue;
        }

        let pattern_successive = pattern.successive_rejection_filter(p);
        if RejectionFilter::filter_match(pattern_successive, candidate_successive[c]) == FilterResult::No {
            continue;
        }

        if pattern.lowercase_bytes()[p] == indexed.lowercase_bytes[c] {
            let extends_last = matched_ranges.last().map(|r| r.hi == c).unwrap_or(false);
            let restore = if extends_last {
                let last = matched_ranges.last_mut().unwrap();
                let prev = *last;
                last.hi = c + 1;
                RestoredRange::Restore(prev)
            } else {
                matched_ranges.push(MatchedRange { lo: c, hi: c + 1 });
                RestoredRange::Unwind
            };

            let skip_to = next_starts[c];
            if skip_to < candidate_len {
                stack.push(Step {
                    pattern_index: p,
                    candidate_index: skip_to,
                    restored_range: restore,
                });
            } else {
                // still need to undo this mutation once we're done exploring
                // the "advance" branch below; push a pure-undo step.
                stack.push(Step {
                    pattern_index: p,
                    candidate_index: candidate_len,
                    restored_range: restore,
                });
            }
            stack.push(Step {
                pattern_index: p + 1,
                candidate_index: c + 1,
                restored_range: RestoredRange::None,
            });
        } else {
            let skip_to = next_starts[c];
            if skip_to < candidate_len {
                stack.push(Step {
                    pattern_index: p,
                    candidate_index: skip_to,
                    restored_range: RestoredRange::None,
                });
            }
        }
    }

    best.map(|b| (b, best_ranges))
}
