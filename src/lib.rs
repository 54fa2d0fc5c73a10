//! Fuzzy code-completion matching and ranking.
//!
//! This crate filters, scores and ranks candidate identifiers (symbols,
//! file names, project symbols) against a user-typed pattern. It is a pure
//! library: no editor/LSP transport, no persistence, no file I/O. Given
//! [`CandidateBatch`]es and a [`Pattern`], [`ScoredMatchSelector`] produces
//! per-candidate text scores in parallel; [`select_best_matches`] then
//! folds those scores together with an externally supplied semantic score,
//! applies contextual influence, and returns a deterministically ordered
//! [`Selection`].
//!
//! The scoring path is total: no candidate, however pathological, causes an
//! error. See [`error`] for the one opt-in, development-time fallible
//! boundary this crate exposes.

#![warn(missing_docs)]

#[macro_use]
extern crate log;

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod candidate;
pub mod collator;
pub mod config;
pub mod error;
pub mod filter;
mod helper;
pub mod influence;
pub mod matcher;
pub mod pattern;
pub mod selector;
pub mod token;

pub use candidate::{Candidate, CandidateBatch};
pub use collator::{CompletionScore, Match, Selection, select_best_matches, tokenize_influencing};
pub use config::{ContentTypeProfile, ScoringConfig, content_type_profile};
pub use error::{ValidationError, validate_matches};
pub use filter::{FilterResult, RejectionFilter};
pub use influence::{InfluenceScorer, TokenizedIdentifier};
pub use matcher::{MatchedRange, Matcher, Precision, TextScore};
pub use pattern::Pattern;
pub use selector::{CandidateBatchesMatch, ScoredMatchSelector};
pub use token::{ContentType, Token, Tokenization, Tokenizer};

/// Score `candidate` against `pattern` with the default [`ScoringConfig`],
/// for simple one-off call sites that don't need a reusable [`Matcher`] or a
/// full [`ScoredMatchSelector`]/[`select_best_matches`] pipeline.
///
/// Returns `None` if the pattern cannot occur in the candidate at all.
pub fn fuzzy_match(pattern: &str, candidate: &[u8], content_type: ContentType, precision: Precision) -> Option<f64> {
    let matcher = Matcher::default();
    let p = Pattern::new(pattern);
    let mut batch = CandidateBatch::new(candidate.len());
    batch.append(candidate, content_type);
    matcher
        .match_and_score(&p, batch.candidate_at(0), precision)
        .map(|s| s.value)
}

/// A pattern bound to one [`Matcher`], for call sites that score many
/// candidates against the same user-typed query and want to build the
/// matcher (and its [`ScoringConfig`]) exactly once.
///
/// [`Pattern::score`] is more convenient for a single one-off lookup, but it
/// rebuilds a default-configured [`Matcher`] on every call; `FuzzyMatcher`
/// amortizes that and lets the caller supply a non-default config.
pub struct FuzzyMatcher {
    pattern: Pattern,
    matcher: Matcher,
}

impl FuzzyMatcher {
    /// Build a matcher for `query`, scoring with `config`.
    pub fn new(query: &str, config: ScoringConfig) -> Self {
        FuzzyMatcher {
            pattern: Pattern::new(query),
            matcher: Matcher::new(config),
        }
    }

    /// The precomputed pattern this matcher scores candidates against.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Score `candidate` against the bound pattern, or `None` if the pattern
    /// cannot occur in it at all.
    pub fn score(&self, candidate: &[u8], content_type: ContentType, precision: Precision) -> Option<f64> {
        let candidate = Candidate {
            bytes: candidate,
            content_type,
            rejection_filter: RejectionFilter::from_bytes(candidate),
        };
        self.matcher
            .match_and_score(&self.pattern, candidate, precision)
            .map(|s| s.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fuzzy_matcher_reuses_pattern_and_matcher_across_candidates() {
        let fm = FuzzyMatcher::new("load", ScoringConfig::default());
        assert!(fm.score(b"loadData", ContentType::CodeCompletionSymbol, Precision::Fast).is_some());
        assert!(fm.score(b"saveData", ContentType::CodeCompletionSymbol, Precision::Fast).is_none());
    }

    #[test]
    fn free_function_scores_a_simple_match() {
        let score = fuzzy_match("name", b"filename", ContentType::Unknown, Precision::Fast);
        assert!(score.is_some());
    }

    #[test]
    fn free_function_rejects_impossible_pattern() {
        let score = fuzzy_match("xyz", b"hello_world", ContentType::Unknown, Precision::Fast);
        assert!(score.is_none());
    }
}
