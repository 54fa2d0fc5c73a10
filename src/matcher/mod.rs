//! Fast and thorough pattern-against-candidate matching and scoring.

mod score;
mod styles;
mod thorough;

use std::cmp::Ordering;

use crate::candidate::Candidate;
use crate::config::ScoringConfig;
use crate::pattern::Pattern;
use crate::token::{ContentType, Tokenization, Tokenizer};

/// How much effort to spend scoring a single candidate.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Precision {
    /// Try the five match-style heuristics in order and stop at the first
    /// that succeeds.
    Fast,
    /// Exhaustively search partitionings with a bounded backtracking search,
    /// guaranteed to score at least as well as [`Precision::Fast`].
    Thorough,
}

/// Which of the five match heuristics produced a set of ranges, if any.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum MatchStyle {
    /// `candidate.lowercase` contains `pattern.lowercase` as a substring.
    LowercaseContinuous,
    /// Each matched token contributes a run of leading bytes (possibly one).
    Acronym,
    /// Case-sensitive substring match.
    MixedcaseContinuous,
    /// Greedy in-order, case-sensitive.
    MixedcaseGreedy,
    /// Greedy in-order, case-insensitive.
    LowercaseGreedy,
}

/// A contiguous byte range `[lo, hi)` matched against the candidate.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct MatchedRange {
    /// Inclusive start offset.
    pub lo: usize,
    /// Exclusive end offset.
    pub hi: usize,
}

impl MatchedRange {
    pub(crate) fn len(self) -> usize {
        self.hi - self.lo
    }
}

/// The outcome of scoring one candidate against one pattern.
#[derive(Copy, Clone, Debug)]
pub struct TextScore {
    /// Raw scalar score; higher is better.
    pub value: f64,
    /// Count of "false start" token fragments; fewer is better, used only
    /// to break ties between equal `value`s.
    pub false_starts: u32,
}

impl TextScore {
    /// The lowest-ranked possible score, used as a fold seed.
    pub const WORST: TextScore = TextScore {
        value: f64::NEG_INFINITY,
        false_starts: u32::MAX,
    };

    /// Total order: higher `value` wins; ties broken by fewer `false_starts`.
    pub fn is_better_than(self, other: TextScore) -> bool {
        match self.value.partial_cmp(&other.value) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Less) => false,
            _ => self.false_starts < other.false_starts,
        }
    }
}

/// Scratch state built once per candidate and reused across match styles and
/// the thorough search.
pub(crate) struct IndexedCandidate<'a> {
    pub lowercase_bytes: Vec<u8>,
    pub mixedcase_bytes: &'a [u8],
    pub tokenization: Tokenization,
    pub content_type: ContentType,
    pub first_matching_lowercase_byte_index: usize,
}

impl<'a> IndexedCandidate<'a> {
    fn new(candidate: Candidate<'a>, first_matching_lowercase_byte_index: usize) -> Self {
        let lowercase_bytes: Vec<u8> = candidate
            .bytes
            .iter()
            .map(|&b| if b.is_ascii_uppercase() { b | 0x20 } else { b })
            .collect();
        let tokenization = Tokenizer::tokenize(candidate.bytes, candidate.content_type);
        IndexedCandidate {
            lowercase_bytes,
            mixedcase_bytes: candidate.bytes,
            tokenization,
            content_type: candidate.content_type,
            first_matching_lowercase_byte_index,
        }
    }

    fn len(&self) -> usize {
        self.lowercase_bytes.len()
    }
}

/// Matches a [`Pattern`] against candidates and scores the result.
#[derive(Clone, Debug, Default)]
pub struct Matcher {
    config: ScoringConfig,
}

impl Matcher {
    /// Build a matcher with the given scoring configuration.
    pub fn new(config: ScoringConfig) -> Self {
        Matcher { config }
    }

    /// The scoring configuration this matcher was built with.
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Whether `pattern` can be definitively ruled out for `candidate` by the
    /// cheap [`crate::filter::RejectionFilter`] bitmask check alone, without
    /// scanning any bytes. Exposed so callers that want to count/sample
    /// rejections (see `ScoredMatchSelector::scored_matches`) don't need to
    /// duplicate the check.
    pub fn quick_reject(&self, pattern: &Pattern, candidate: Candidate<'_>) -> bool {
        use crate::filter::{FilterResult, RejectionFilter};

        !pattern.is_empty()
            && RejectionFilter::filter_match(pattern.rejection_filter(), candidate.rejection_filter)
                == FilterResult::No
    }

    /// Find the first candidate byte index that could start a greedy match
    /// of `pattern`, or `None` if no such index exists.
    pub fn match_location(&self, pattern: &Pattern, candidate: Candidate<'_>) -> Option<usize> {
        if self.quick_reject(pattern, candidate) {
            return None;
        }
        if pattern.is_empty() {
            return Some(0);
        }

        let first_pattern_byte = pattern.lowercase_bytes()[0];
        for (i, &b) in candidate.bytes.iter().enumerate() {
            let lower = if b.is_ascii_uppercase() { b | 0x20 } else { b };
            if lower == first_pattern_byte && styles::greedy_matches_from(pattern, candidate.bytes, i, false) {
                return Some(i);
            }
        }
        None
    }

    /// Match and score one candidate, or `None` if the pattern cannot occur
    /// in it at all.
    pub fn match_and_score(
        &self,
        pattern: &Pattern,
        candidate: Candidate<'_>,
        precision: Precision,
    ) -> Option<TextScore> {
        self.match_and_score_with_ranges(pattern, candidate, precision, false)
            .map(|(score, _)| score)
    }

    /// Match and score one candidate, also returning the matched byte ranges
    /// when `capture_ranges` is set (useful for highlighting matched
    /// substrings in a UI). Pass `false` when only the score is needed to
    /// avoid the extra allocation.
    pub fn match_and_score_with_ranges(
        &self,
        pattern: &Pattern,
        candidate: Candidate<'_>,
        precision: Precision,
        capture_ranges: bool,
    ) -> Option<(TextScore, Vec<MatchedRange>)> {
        let start = self.match_location(pattern, candidate)?;
        if pattern.is_empty() {
            return Some((
                TextScore {
                    value: 1.0,
                    false_starts: 0,
                },
                Vec::new(),
            ));
        }

        let indexed = IndexedCandidate::new(candidate, start);

        match precision {
            Precision::Fast => {
                let (ranges, style) = styles::fast_match(pattern, &indexed)?;
                let score = score::single_score(&self.config, pattern, candidate, &indexed, &ranges, Precision::Fast, Some(style));
                Some((score, if capture_ranges { ranges } else { Vec::new() }))
            }
            Precision::Thorough => {
                match thorough::thorough_score(&self.config, pattern, candidate, &indexed, capture_ranges) {
                    Some((score, ranges)) => Some((score, ranges)),
                    None => {
                        // thorough must be >= fast: fall back to fast styles.
                        let (ranges, style) = styles::fast_match(pattern, &indexed)?;
                        let score = score::single_score(
                            &self.config,
                            pattern,
                            candidate,
                            &indexed,
                            &ranges,
                            Precision::Thorough,
                            Some(style),
                        );
                        Some((score, if capture_ranges { ranges } else { Vec::new() }))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::CandidateBatch;
    use crate::token::ContentType;

    fn score_str(pattern: &str, candidate: &str, ct: ContentType, precision: Precision) -> Option<TextScore> {
        let matcher = Matcher::default();
        let p = Pattern::new(pattern);
        let mut batch = CandidateBatch::new(candidate.len());
        batch.append(candidate.as_bytes(), ct);
        matcher.match_and_score(&p, batch.candidate_at(0), precision)
    }

    #[test]
    fn empty_pattern_always_scores_one() {
        let s = score_str("", "anything", ContentType::Unknown, Precision::Fast).unwrap();
        assert_eq!(s.value, 1.0);
        assert_eq!(s.false_starts, 0);
    }

    #[test]
    fn rejection_filter_prevents_impossible_match() {
        assert!(score_str("xyz", "hello_world", ContentType::Unknown, Precision::Fast).is_none());
    }

    #[test]
    fn contiguous_lowercase_matches() {
        let s = score_str("name", "filename", ContentType::Unknown, Precision::Fast);
        assert!(s.is_some());
    }

    #[test]
    fn thorough_is_never_worse_than_fast_on_random_identifiers() {
        use rand::Rng;
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let alphabet = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_";
        let mut rng = StdRng::seed_from_u64(0xF00D);
        for _ in 0..200 {
            let len = rng.random_range(4..40);
            let candidate: Vec<u8> = (0..len).map(|_| alphabet[rng.random_range(0..alphabet.len())]).collect();
            let candidate = String::from_utf8(candidate).unwrap();

            // a lowercased prefix of the candidate is always a valid greedy
            // (and lowercase-continuous) match, so `fast` is guaranteed `Some`.
            let pattern_len = rng.random_range(1..=len.min(6));
            let pattern: String = candidate.to_lowercase().chars().take(pattern_len).collect();

            let fast = score_str(&pattern, &candidate, ContentType::CodeCompletionSymbol, Precision::Fast);
            let thorough = score_str(&pattern, &candidate, ContentType::CodeCompletionSymbol, Precision::Thorough);

            let (f, t) = (fast.unwrap(), thorough.unwrap());
            assert!(t.is_better_than(f) || t.value == f.value, "pattern={pattern:?} candidate={candidate:?}");
        }
    }

    #[test]
    fn thorough_is_never_worse_than_fast() {
        for (pattern, candidate) in [
            ("name", "filenames(name:)"),
            ("tamic", "translatesAutoresizingMaskIntoConstraints"),
            ("load", "loadDataFromFile"),
        ] {
            let fast = score_str(pattern, candidate, ContentType::CodeCompletionSymbol, Precision::Fast);
            let thorough = score_str(pattern, candidate, ContentType::CodeCompletionSymbol, Precision::Thorough);
            match (fast, thorough) {
                (Some(f), Some(t)) => assert!(t.is_better_than(f) || t.value == f.value),
                (None, _) => {}
                (Some(_), None) => panic!("thorough lost a match fast found"),
            }
        }
    }
}
