//! Final selection: dense group scoring, two-stage rescoring, contextual
//! influence, multi-criterion cutoffs, and a deterministic sort.

use std::cmp::Ordering;

use indexmap::IndexMap;
use log::warn;
use rayon::prelude::*;

use crate::candidate::CandidateBatch;
use crate::config::{BEST_REJECTED_TEXT_SCORE_BY_PATTERN_LENGTH, ScoringConfig};
use crate::influence::{InfluenceScorer, TokenizedIdentifier};
use crate::matcher::{Matcher, Precision};
use crate::pattern::Pattern;

/// A composite score combining the text matcher's judgement with an
/// externally supplied semantic signal.
#[derive(Copy, Clone, Debug)]
pub struct CompletionScore {
    /// Score contributed by text matching (this crate).
    pub text_component: f64,
    /// Score contributed by an external semantic ranker.
    pub semantic_component: f64,
}

impl CompletionScore {
    /// The composite value used for ranking: `text * semantic`.
    pub fn value(&self) -> f64 {
        self.text_component * self.semantic_component
    }
}

/// One scored, pre-selection candidate, as supplied by the caller.
#[derive(Clone, Debug)]
pub struct Match {
    /// The candidate's raw bytes, used for tie-break ordering.
    pub identifier: Vec<u8>,
    /// Index into the batches passed to [`select_best_matches`].
    pub batch_index: usize,
    /// Index of the candidate within that batch.
    pub candidate_index: usize,
    /// Dense-or-sparse grouping key; matches sharing a group share a
    /// group-wide score ceiling.
    pub group_id: Option<u64>,
    /// The combined text/semantic score.
    pub score: CompletionScore,
    /// False-start count from the last text scoring pass.
    pub false_starts: u32,
}

/// The outcome of [`select_best_matches`].
#[derive(Debug)]
pub struct Selection {
    /// Which precision was actually used to arrive at this selection.
    pub precision: Precision,
    /// The surviving matches, in final display order.
    pub matches: Vec<Match>,
}

fn refresh_group_scores(matches: &[Match], dense_group_id: &[Option<usize>], group_count: usize) -> Vec<f64> {
    let mut group_scores = vec![f64::NEG_INFINITY; group_count];
    for (m, g) in matches.iter().zip(dense_group_id.iter()) {
        if let Some(gi) = g {
            let v = m.score.value();
            if v > group_scores[*gi] {
                group_scores[*gi] = v;
            }
        }
    }
    group_scores
}

fn primary_key(m: &Match, gid: Option<usize>, group_scores: &[f64]) -> f64 {
    match gid {
        Some(gi) => group_scores[gi],
        None => m.score.value(),
    }
}

fn cmp_f64_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Assign dense, per-batch group IDs to matches carrying a sparse
/// `group_id`, in first-appearance order. Returns the per-match dense ID (if
/// any) and the total group count.
fn assign_dense_group_ids(matches: &[Match]) -> (Vec<Option<usize>>, usize) {
    let mut seen: IndexMap<(usize, u64), usize> = IndexMap::new();
    let mut dense = Vec::with_capacity(matches.len());
    for m in matches {
        match m.group_id {
            Some(gid) => {
                let key = (m.batch_index, gid);
                let next_index = seen.len();
                let idx = *seen.entry(key).or_insert(next_index);
                dense.push(Some(idx));
            }
            None => dense.push(None),
        }
    }
    let count = seen.len();
    (dense, count)
}

/// Split identifiers into tokens usable as influence input for
/// [`select_best_matches`].
pub fn tokenize_influencing(identifiers: &[String], filter_low_signal: bool) -> Vec<TokenizedIdentifier> {
    crate::influence::tokenize_influencing(identifiers, filter_low_signal)
}

fn validate_indices(matches: &[Match], batches: &[CandidateBatch]) {
    for (i, m) in matches.iter().enumerate() {
        debug_assert!(m.batch_index < batches.len(), "match {i} references missing batch {}", m.batch_index);
        match batches.get(m.batch_index) {
            Some(batch) => {
                debug_assert!(
                    m.candidate_index < batch.len(),
                    "match {i} references missing candidate {} in batch {}",
                    m.candidate_index,
                    m.batch_index
                );
                if m.candidate_index >= batch.len() {
                    warn!(
                        "match {i} references candidate {} but batch {} only has {} candidates; skipping bounds-dependent work for it",
                        m.candidate_index,
                        m.batch_index,
                        batch.len()
                    );
                }
            }
            None => warn!(
                "match {i} references batch {} but only {} batches were supplied",
                m.batch_index,
                batches.len()
            ),
        }
    }
}

/// Select and order the best matches out of a caller-supplied candidate set.
///
/// `tie_breaker` is consulted only when the final result set is small enough
/// (`<= max_items_for_expensive_selection`) to keep worst-case cost bounded.
#[allow(clippy::too_many_arguments)]
pub fn select_best_matches(
    config: &ScoringConfig,
    matcher: &Matcher,
    matches: Vec<Match>,
    batches: &[CandidateBatch],
    pattern: &Pattern,
    influencing_tokenized_identifiers: &[TokenizedIdentifier],
    tie_breaker: Option<&(dyn Fn(&Match, &Match) -> Ordering + Sync)>,
    max_items_for_expensive_selection: usize,
) -> Selection {
    validate_indices(&matches, batches);

    let (mut dense_group_id, group_count) = assign_dense_group_ids(&matches);
    let mut matches = matches;
    let mut group_scores = refresh_group_scores(&matches, &dense_group_id, group_count);

    let pattern_len = pattern.len();
    let cutoff_ratio = (2.0 / 3.0) * (pattern_len.max(1) as f64 / 4.0).min(1.0);
    let thorough_threshold = config.minimum_pattern_length_to_always_rescore_with_thorough_precision;
    let take_thorough_path =
        pattern_len >= thorough_threshold || matches.len() <= max_items_for_expensive_selection;

    let precision;
    if take_thorough_path {
        precision = Precision::Thorough;

        if matches.len() > max_items_for_expensive_selection {
            let mut order: Vec<usize> = (0..matches.len()).collect();
            order.sort_by(|&a, &b| {
                cmp_f64_desc(
                    primary_key(&matches[a], dense_group_id[a], &group_scores),
                    primary_key(&matches[b], dense_group_id[b], &group_scores),
                )
                .then_with(|| cmp_f64_desc(matches[a].score.value(), matches[b].score.value()))
            });
            order.truncate(max_items_for_expensive_selection);
            order.sort_unstable();
            matches = order.iter().map(|&i| matches[i].clone()).collect();
            dense_group_id = order.iter().map(|&i| dense_group_id[i]).collect();
            group_scores = refresh_group_scores(&matches, &dense_group_id, group_count);
        }

        let rescored: Vec<(f64, u32)> = matches
            .par_iter()
            .map(|m| {
                let candidate = batches[m.batch_index].candidate_at(m.candidate_index);
                match matcher.match_and_score(pattern, candidate, Precision::Thorough) {
                    Some(score) => (score.value, score.false_starts),
                    None => (0.0, u32::MAX),
                }
            })
            .collect();
        for (m, (value, false_starts)) in matches.iter_mut().zip(rescored) {
            m.score.text_component = value;
            m.false_starts = false_starts;
        }
        group_scores = refresh_group_scores(&matches, &dense_group_id, group_count);

        let mut top_value = f64::NEG_INFINITY;
        let mut top_false_starts = u32::MAX;
        let mut top_semantic = f64::NEG_INFINITY;
        for m in &matches {
            let v = m.score.value();
            if v > top_value {
                top_value = v;
                top_false_starts = m.false_starts;
            }
            if m.score.semantic_component > top_semantic {
                top_semantic = m.score.semantic_component;
            }
        }
        let composite_cutoff = cutoff_ratio * top_value;
        let semantic_cutoff_for_false_starts_exemption = top_semantic / 3.0;
        let best_rejected_text_score = BEST_REJECTED_TEXT_SCORE_BY_PATTERN_LENGTH[pattern_len.min(10)];

        let mut kept_matches = Vec::with_capacity(matches.len());
        let mut kept_dense = Vec::with_capacity(matches.len());
        for (m, gid) in matches.into_iter().zip(dense_group_id.into_iter()) {
            let keep = m.score.text_component > best_rejected_text_score
                && m.false_starts <= config.max_false_starts
                && (m.score.value() >= composite_cutoff
                    || (m.false_starts <= top_false_starts
                        && m.score.semantic_component >= semantic_cutoff_for_false_starts_exemption));
            if keep {
                kept_matches.push(m);
                kept_dense.push(gid);
            }
        }
        matches = kept_matches;
        dense_group_id = kept_dense;
        group_scores = refresh_group_scores(&matches, &dense_group_id, group_count);
    } else {
        precision = Precision::Fast;
        let top_semantic = matches
            .iter()
            .map(|m| m.score.semantic_component)
            .fold(f64::NEG_INFINITY, f64::max);
        let threshold = cutoff_ratio * top_semantic;

        let mut kept_matches = Vec::with_capacity(matches.len());
        let mut kept_dense = Vec::with_capacity(matches.len());
        for (m, gid) in matches.into_iter().zip(dense_group_id.into_iter()) {
            if m.score.semantic_component >= threshold {
                kept_matches.push(m);
                kept_dense.push(gid);
            }
        }
        matches = kept_matches;
        dense_group_id = kept_dense;
        group_scores = refresh_group_scores(&matches, &dense_group_id, group_count);
    }

    if !influencing_tokenized_identifiers.is_empty() {
        let scorer = InfluenceScorer::new(influencing_tokenized_identifiers);
        let bonuses: Vec<f64> = matches
            .par_iter()
            .map(|m| {
                let candidate = batches[m.batch_index].candidate_at(m.candidate_index);
                scorer.score(candidate.bytes, candidate.content_type)
            })
            .collect();
        for (m, bonus) in matches.iter_mut().zip(bonuses) {
            m.score.text_component *= 1.0 + bonus * config.max_influence_bonus;
        }
        group_scores = refresh_group_scores(&matches, &dense_group_id, group_count);
    }

    let allow_tie_breaker = matches.len() <= max_items_for_expensive_selection;
    let mut order: Vec<usize> = (0..matches.len()).collect();
    order.sort_by(|&a, &b| {
        cmp_f64_desc(
            primary_key(&matches[a], dense_group_id[a], &group_scores),
            primary_key(&matches[b], dense_group_id[b], &group_scores),
        )
        .then_with(|| cmp_f64_desc(matches[a].score.value(), matches[b].score.value()))
        .then_with(|| matches[a].identifier.cmp(&matches[b].identifier))
        .then_with(|| {
            if allow_tie_breaker {
                if let Some(tb) = tie_breaker {
                    return tb(&matches[a], &matches[b]);
                }
            }
            Ordering::Equal
        })
        .then_with(|| a.cmp(&b))
    });

    let ordered = order.into_iter().map(|i| matches[i].clone()).collect();
    Selection {
        precision,
        matches: ordered,
    }
}
