//! The one genuine fallible boundary in this crate: validating externally
//! supplied match records before they reach index-guarded internals.
//!
//! Scoring itself is total (see `SPEC_FULL.md` §7) — there is no `Result`
//! anywhere on the hot path. This module exists purely as an opt-in
//! development-time check for embedding code that builds [`Match`] records
//! by hand.

use thiserror::Error;

use crate::candidate::CandidateBatch;
use crate::collator::Match;

/// A [`Match`] referenced a batch or candidate index that doesn't exist.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ValidationError {
    /// `batch_index` is not a valid index into the supplied batches.
    #[error(
        "match {match_index} references batch {batch_index}, but only {batch_count} batches were supplied"
    )]
    BatchIndexOutOfRange {
        /// Index into the input match slice.
        match_index: usize,
        /// The out-of-range batch index the match referenced.
        batch_index: usize,
        /// Number of batches actually supplied.
        batch_count: usize,
    },
    /// `candidate_index` is not a valid index into its batch.
    #[error(
        "match {match_index} references candidate {candidate_index} in batch {batch_index}, but that batch only has {candidate_count} candidates"
    )]
    CandidateIndexOutOfRange {
        /// Index into the input match slice.
        match_index: usize,
        /// The batch the match referenced.
        batch_index: usize,
        /// The out-of-range candidate index the match referenced.
        candidate_index: usize,
        /// Number of candidates actually in that batch.
        candidate_count: usize,
    },
}

/// Check that every match's `batch_index`/`candidate_index` resolves against
/// `batches`. Intended for development and test builds; the scoring hot
/// path relies on `debug_assert!` instead so release builds stay
/// branch-free.
pub fn validate_matches(matches: &[Match], batches: &[CandidateBatch]) -> Result<(), ValidationError> {
    for (match_index, m) in matches.iter().enumerate() {
        let Some(batch) = batches.get(m.batch_index) else {
            return Err(ValidationError::BatchIndexOutOfRange {
                match_index,
                batch_index: m.batch_index,
                batch_count: batches.len(),
            });
        };
        if m.candidate_index >= batch.len() {
            return Err(ValidationError::CandidateIndexOutOfRange {
                match_index,
                batch_index: m.batch_index,
                candidate_index: m.candidate_index,
                candidate_count: batch.len(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collator::CompletionScore;
    use crate::token::ContentType;

    fn batches() -> Vec<CandidateBatch> {
        let mut b = CandidateBatch::new(8);
        b.append(b"foo", ContentType::Unknown);
        vec![b]
    }

    fn make_match(batch_index: usize, candidate_index: usize) -> Match {
        Match {
            identifier: b"foo".to_vec(),
            batch_index,
            candidate_index,
            group_id: None,
            score: CompletionScore {
                text_component: 1.0,
                semantic_component: 1.0,
            },
            false_starts: 0,
        }
    }

    #[test]
    fn valid_matches_pass() {
        let batches = batches();
        assert!(validate_matches(&[make_match(0, 0)], &batches).is_ok());
    }

    #[test]
    fn out_of_range_batch_is_rejected() {
        let batches = batches();
        assert_eq!(
            validate_matches(&[make_match(1, 0)], &batches),
            Err(ValidationError::BatchIndexOutOfRange {
                match_index: 0,
                batch_index: 1,
                batch_count: 1
            })
        );
    }

    #[test]
    fn out_of_range_candidate_is_rejected() {
        let batches = batches();
        assert_eq!(
            validate_matches(&[make_match(0, 5)], &batches),
            Err(ValidationError::CandidateIndexOutOfRange {
                match_index: 0,
                batch_index: 0,
                candidate_index: 5,
                candidate_count: 1
            })
        );
    }
}
