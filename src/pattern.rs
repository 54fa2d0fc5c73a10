//! Immutable, precomputed representation of a user-typed query.

use std::ops::Range;

use crate::candidate::Candidate;
use crate::filter::RejectionFilter;
use crate::matcher::{Matcher, Precision};
use crate::token::ContentType;

#[inline]
fn ascii_lowercase(b: u8) -> u8 {
    if b.is_ascii_uppercase() { b | 0x20 } else { b }
}

/// A user-typed search pattern, precomputed once and reused across every
/// candidate it is scored against.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Pattern {
    mixedcase_bytes: Vec<u8>,
    lowercase_bytes: Vec<u8>,
    rejection_filter: RejectionFilter,
    has_mixedcase: bool,
    /// `successive_rejection_filters[i]` is the union of filter bits for
    /// `lowercase_bytes[i..]`.
    successive_rejection_filters: Vec<RejectionFilter>,
}

impl Pattern {
    /// Build a pattern from user-typed text.
    pub fn new(text: &str) -> Self {
        let mixedcase_bytes: Vec<u8> = text.as_bytes().to_vec();
        let lowercase_bytes: Vec<u8> = mixedcase_bytes.iter().map(|&b| ascii_lowercase(b)).collect();
        let has_mixedcase = mixedcase_bytes != lowercase_bytes;
        let rejection_filter = RejectionFilter::from_lowercase_bytes(&lowercase_bytes);

        let mut successive = vec![RejectionFilter::EMPTY; lowercase_bytes.len()];
        let mut running = RejectionFilter::EMPTY;
        for i in (0..lowercase_bytes.len()).rev() {
            running = running.union_byte(lowercase_bytes[i]);
            successive[i] = running;
        }

        Pattern {
            mixedcase_bytes,
            lowercase_bytes,
            rejection_filter,
            has_mixedcase,
            successive_rejection_filters: successive,
        }
    }

    /// Number of UTF-8 bytes in the pattern.
    pub fn len(&self) -> usize {
        self.lowercase_bytes.len()
    }

    /// Whether the pattern has zero bytes.
    pub fn is_empty(&self) -> bool {
        self.lowercase_bytes.is_empty()
    }

    /// Mixed-case (original) bytes.
    pub fn mixedcase_bytes(&self) -> &[u8] {
        &self.mixedcase_bytes
    }

    /// ASCII-lowercased bytes.
    pub fn lowercase_bytes(&self) -> &[u8] {
        &self.lowercase_bytes
    }

    /// Overall rejection filter for the whole pattern.
    pub fn rejection_filter(&self) -> RejectionFilter {
        self.rejection_filter
    }

    /// Whether the pattern's original text had any non-lowercase byte.
    pub fn has_mixedcase(&self) -> bool {
        self.has_mixedcase
    }

    /// Rejection filter covering `lowercase_bytes[index..]`.
    pub fn successive_rejection_filter(&self, index: usize) -> RejectionFilter {
        self.successive_rejection_filters[index]
    }

    /// Score `candidate_bytes` against this pattern with a default-configured
    /// matcher, for simple one-off call sites. Candidates scored
    /// repeatedly against the same pattern should build a [`Matcher`] once
    /// instead (e.g. via [`crate::FuzzyMatcher`]) to avoid re-deriving it.
    pub fn score(&self, candidate_bytes: &[u8], content_type: ContentType, precision: Precision) -> f64 {
        self.score_with_ranges(candidate_bytes, content_type, precision, false).0
    }

    /// Like [`score`](Self::score), also returning the matched byte ranges
    /// when `capture_matching_ranges` is set, for highlighting matched
    /// substrings in a UI.
    pub fn score_with_ranges(
        &self,
        candidate_bytes: &[u8],
        content_type: ContentType,
        precision: Precision,
        capture_matching_ranges: bool,
    ) -> (f64, Vec<Range<usize>>) {
        let candidate = Candidate {
            bytes: candidate_bytes,
            content_type,
            rejection_filter: RejectionFilter::from_bytes(candidate_bytes),
        };
        match Matcher::default().match_and_score_with_ranges(self, candidate, precision, capture_matching_ranges) {
            Some((score, ranges)) => (score.value, ranges.into_iter().map(|r| r.lo..r.hi).collect()),
            None => (0.0, Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterResult;

    #[test]
    fn empty_pattern_has_empty_filter() {
        let p = Pattern::new("");
        assert!(p.is_empty());
        assert_eq!(p.rejection_filter().bits(), RejectionFilter::EMPTY.bits());
    }

    #[test]
    fn detects_mixedcase() {
        assert!(!Pattern::new("name").has_mixedcase());
        assert!(Pattern::new("Name").has_mixedcase());
    }

    #[test]
    fn successive_filters_shrink_moving_right() {
        let p = Pattern::new("abcd");
        // the last successive filter only covers the final byte.
        let last = p.successive_rejection_filter(3);
        let first = p.successive_rejection_filter(0);
        assert_eq!(last.bits() & first.bits(), last.bits());
    }

    #[test]
    fn successive_filter_rejects_missing_tail_bytes() {
        let p = Pattern::new("abz");
        let candidate = RejectionFilter::from_string("ab");
        assert_eq!(
            RejectionFilter::filter_match(p.successive_rejection_filter(2), candidate),
            FilterResult::No
        );
    }

    #[test]
    fn score_matches_score_with_ranges_value() {
        let p = Pattern::new("name");
        let value = p.score(b"filename", ContentType::CodeCompletionSymbol, Precision::Fast);
        let (value_again, ranges) = p.score_with_ranges(b"filename", ContentType::CodeCompletionSymbol, Precision::Fast, true);
        assert_eq!(value, value_again);
        assert!(!ranges.is_empty());
        assert_eq!(ranges.iter().map(|r| r.end - r.start).sum::<usize>(), p.len());
    }

    #[test]
    fn score_with_ranges_omits_ranges_when_not_requested() {
        let p = Pattern::new("name");
        let (value, ranges) = p.score_with_ranges(b"filename", ContentType::CodeCompletionSymbol, Precision::Fast, false);
        assert!(value > 0.0);
        assert!(ranges.is_empty());
    }

    #[test]
    fn score_is_zero_for_impossible_pattern() {
        let p = Pattern::new("xyz");
        assert_eq!(p.score(b"hello_world", ContentType::Unknown, Precision::Fast), 0.0);
    }
}
