//! The scalar scoring formula applied to one set of matched ranges.

use super::{IndexedCandidate, MatchStyle, MatchedRange, Precision, TextScore};
use crate::candidate::Candidate;
use crate::config::{ScoringConfig, content_type_profile};
use crate::pattern::Pattern;

/// Score one candidate given a populated set of matched ranges.
///
/// This is the single scalar formula every match style and every thorough
/// search partition funnels through; see `SPEC_FULL.md` §4.5.5 for the
/// derivation this mirrors.
pub(crate) fn single_score(
    config: &ScoringConfig,
    pattern: &Pattern,
    candidate: Candidate<'_>,
    indexed: &IndexedCandidate<'_>,
    ranges: &[MatchedRange],
    precision: Precision,
    match_style: Option<MatchStyle>,
) -> TextScore {
    if ranges.is_empty() {
        return TextScore {
            value: 0.0,
            false_starts: 0,
        };
    }

    let profile = content_type_profile(candidate.content_type);
    let tokenization = &indexed.tokenization;
    let l = indexed.len() as f64;
    let p = pattern.len() as f64;

    let leading_case_matchable_count = if profile.content_after_base_name_is_trivial {
        tokenization.base_name_length
    } else {
        indexed.len()
    };

    // byte offset within the pattern of the start of each range, needed to
    // walk matched bytes against the pattern's mixed-case form in order.
    let mut uppercase_matches = 0u32;
    let mut uppercase_mismatches = 0u32;
    let mut any_case_matches = 0u32;
    let mut is_prefix_uppercase_match = false;

    let mut pattern_cursor = 0usize;
    for range in ranges {
        for c in range.lo..range.hi {
            if c < leading_case_matchable_count {
                let candidate_byte = indexed.mixedcase_bytes[c];
                let pattern_byte = pattern.mixedcase_bytes()[pattern_cursor];
                if candidate_byte == pattern_byte {
                    any_case_matches += 1;
                    if candidate_byte.is_ascii_uppercase() {
                        uppercase_matches += 1;
                        if c == 0 {
                            is_prefix_uppercase_match = true;
                        }
                    }
                } else {
                    uppercase_mismatches += 1;
                }
            } else {
                uppercase_mismatches += 1;
            }
            pattern_cursor += 1;
        }
    }

    let mut false_starts = 0u32;
    let mut bad_short_matches = 0u32;
    let mut incompletely_matched_tokens = 0u32;
    let mut all_runs_start_on_word_start_or_uppercase = true;
    let mut score = 0.0f64;

    let mut pattern_chars_consumed_before = 0usize;
    for range in ranges {
        let range_len = range.hi - range.lo;
        let pattern_chars_remaining_total = pattern.len() - pattern_chars_consumed_before;
        pattern_chars_consumed_before += range_len;

        let start_addr = tokenization.byte_token_addresses[range.lo];
        if start_addr.index_in_token != 0 {
            let is_uppercase_start = indexed.mixedcase_bytes[range.lo].is_ascii_uppercase();
            if !is_uppercase_start {
                all_runs_start_on_word_start_or_uppercase = false;
            }
        }

        // walk this range token-segment by token-segment.
        let mut cursor = range.lo;
        let mut pattern_chars_remaining = pattern_chars_remaining_total;
        let mut matched_token_prefix = false;
        while cursor < range.hi {
            let addr = tokenization.byte_token_addresses[cursor];
            let token = tokenization.tokens[addr.token_index];
            let segment_end_in_token = token.length.min(addr.index_in_token + (range.hi - cursor));
            let segment_len = segment_end_in_token - addr.index_in_token;
            let covered_whole_token = addr.index_in_token == 0 && segment_end_in_token == token.length;
            let later_matches_exist = segment_len < pattern_chars_remaining;
            let incomplete_match = !covered_whole_token && later_matches_exist;

            if incomplete_match || addr.index_in_token != 0 {
                false_starts += 1;
            }
            if incomplete_match && segment_len <= 2 {
                bad_short_matches += 1;
            }
            if addr.index_in_token == 0 {
                matched_token_prefix = true;
            }
            if !covered_whole_token {
                incompletely_matched_tokens += 1;
            }

            pattern_chars_remaining -= segment_len;
            cursor += segment_len;
        }

        if range_len > 1 || matched_token_prefix {
            score += range_len as f64 * (range_len as f64).sqrt();
        }
    }

    if ranges[0].lo > tokenization.base_name_length && indexed.len() > 256 {
        false_starts += 1;
        score *= 0.75;
    }

    if match_style == Some(MatchStyle::Acronym) {
        bad_short_matches = 0;
        false_starts = 0;
    }

    if ranges.len() == 1 && ranges[0].len() == indexed.len() {
        score *= profile.full_match_bonus;
    } else if ranges.len() == 1 && ranges[0].lo == 0 && ranges[0].hi == tokenization.base_name_length {
        score *= profile.full_base_name_match_bonus;
    }

    score += any_case_matches as f64 / (leading_case_matchable_count as f64 + 1.0);
    score += 5.0 * uppercase_matches as f64;
    if pattern.has_mixedcase() {
        score -= 1.5 * uppercase_mismatches as f64;
    }
    score -= 3.0 * bad_short_matches as f64;

    let inv_len = 1.0 / (l + 1.0);
    score += inv_len.powi(4);
    score += 1.5 / (tokenization.tokens.len() as f64 + 1.0);

    if ranges.len() == 1 && ranges[0].lo == 0 {
        score *= profile.prefix_match_bonus;
        let looks_like_a_type =
            tokenization.base_name_length == indexed.len() && tokenization.has_non_uppercase_non_delimiter_bytes;
        if is_prefix_uppercase_match
            && any_case_matches as f64 == p
            && looks_like_a_type
            && profile.eligible_for_type_name_over_local_variable
        {
            score *= config.local_variable_to_global_type_score_ratio;
        }
    }

    if ranges.len() == 1 {
        score += 2.0;
    }
    if ranges[0].lo == 0 {
        score += 2.0;
    }

    if precision == Precision::Thorough {
        if !all_runs_start_on_word_start_or_uppercase {
            score /= 2.0;
        }
        if incompletely_matched_tokens > 1 && match_style != Some(MatchStyle::Acronym) {
            score /= 2.0;
        }
    }

    TextScore {
        value: score,
        false_starts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::CandidateBatch;
    use crate::token::ContentType;

    fn make<'a>(batch: &'a CandidateBatch, i: usize) -> (Candidate<'a>, IndexedCandidate<'a>) {
        let candidate = batch.candidate_at(i);
        (candidate, IndexedCandidate::new(candidate, 0))
    }

    #[test]
    fn full_prefix_match_gets_prefix_bonus() {
        let mut batch = CandidateBatch::new(16);
        batch.append(b"NSString", ContentType::CodeCompletionSymbol);
        let (candidate, indexed) = make(&batch, 0);
        let pattern = Pattern::new("NS");
        let ranges = vec![MatchedRange { lo: 0, hi: 2 }];
        let config = ScoringConfig::default();
        let scored = single_score(&config, &pattern, candidate, &indexed, &ranges, Precision::Thorough, None);
        assert!(scored.value > 0.0);
    }

    #[test]
    fn type_prefix_outranks_lowercase_prefix() {
        let config = ScoringConfig::default();
        let pattern = Pattern::new("NS");

        let mut upper_batch = CandidateBatch::new(16);
        upper_batch.append(b"NSString", ContentType::CodeCompletionSymbol);
        let (upper_candidate, upper_indexed) = make(&upper_batch, 0);
        let upper_score = single_score(
            &config,
            &pattern,
            upper_candidate,
            &upper_indexed,
            &[MatchedRange { lo: 0, hi: 2 }],
            Precision::Thorough,
            None,
        );

        let mut lower_batch = CandidateBatch::new(16);
        lower_batch.append(b"nsstring", ContentType::CodeCompletionSymbol);
        let (lower_candidate, lower_indexed) = make(&lower_batch, 0);
        let lower_score = single_score(
            &config,
            &pattern,
            lower_candidate,
            &lower_indexed,
            &[MatchedRange { lo: 0, hi: 2 }],
            Precision::Thorough,
            None,
        );

        assert!(upper_score.is_better_than(lower_score));
    }

    #[test]
    fn empty_ranges_score_zero() {
        let mut batch = CandidateBatch::new(4);
        batch.append(b"foo", ContentType::Unknown);
        let (candidate, indexed) = make(&batch, 0);
        let pattern = Pattern::new("foo");
        let config = ScoringConfig::default();
        let scored = single_score(&config, &pattern, candidate, &indexed, &[], Precision::Fast, None);
        assert_eq!(scored.value, 0.0);
    }
}
