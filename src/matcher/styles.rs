//! The five fast, single-strategy match heuristics.

use super::{IndexedCandidate, MatchStyle, MatchedRange};
use crate::pattern::Pattern;

#[inline]
fn lower(b: u8) -> u8 {
    if b.is_ascii_uppercase() { b | 0x20 } else { b }
}

/// Whether the pattern (in its original case if `case_sensitive`, else
/// lowercased) can be greedily matched in order starting at `start`.
pub(crate) fn greedy_matches_from(pattern: &Pattern, candidate: &[u8], start: usize, case_sensitive: bool) -> bool {
    let pattern_bytes: &[u8] = if case_sensitive {
        pattern.mixedcase_bytes()
    } else {
        pattern.lowercase_bytes()
    };
    let mut p = 0usize;
    let mut c = start;
    while p < pattern_bytes.len() && c < candidate.len() {
        let cb = if case_sensitive { candidate[c] } else { lower(candidate[c]) };
        if cb == pattern_bytes[p] {
            p += 1;
        }
        c += 1;
    }
    p == pattern_bytes.len()
}

fn lowercase_continuous(pattern: &Pattern, indexed: &IndexedCandidate<'_>) -> Option<Vec<MatchedRange>> {
    let needle = pattern.lowercase_bytes();
    if needle.is_empty() {
        return None;
    }
    let haystack = &indexed.lowercase_bytes[indexed.first_matching_lowercase_byte_index..];
    let pos = haystack
        .windows(needle.len())
        .position(|w| w == needle)?;
    let lo = indexed.first_matching_lowercase_byte_index + pos;
    Some(vec![MatchedRange {
        lo,
        hi: lo + needle.len(),
    }])
}

fn mixedcase_continuous(pattern: &Pattern, indexed: &IndexedCandidate<'_>) -> Option<Vec<MatchedRange>> {
    let needle = pattern.mixedcase_bytes();
    if needle.is_empty() {
        return None;
    }
    let haystack = indexed.mixedcase_bytes;
    let pos = haystack.windows(needle.len()).position(|w| w == needle)?;
    Some(vec![MatchedRange {
        lo: pos,
        hi: pos + needle.len(),
    }])
}

fn greedy_ranges(pattern_bytes: &[u8], candidate_bytes: &[u8], case_sensitive: bool) -> Option<Vec<MatchedRange>> {
    if pattern_bytes.is_empty() {
        return None;
    }
    let mut ranges: Vec<MatchedRange> = Vec::new();
    let mut p = 0usize;
    let mut c = 0usize;
    while p < pattern_bytes.len() && c < candidate_bytes.len() {
        let cb = if case_sensitive {
            candidate_bytes[c]
        } else {
            lower(candidate_bytes[c])
        };
        if cb == pattern_bytes[p] {
            if let Some(last) = ranges.last_mut() {
                if last.hi == c {
                    last.hi = c + 1;
                    p += 1;
                    c += 1;
                    continue;
                }
            }
            ranges.push(MatchedRange { lo: c, hi: c + 1 });
            p += 1;
        }
        c += 1;
    }
    if p == pattern_bytes.len() {
        Some(ranges)
    } else {
        None
    }
}

fn mixedcase_greedy(pattern: &Pattern, indexed: &IndexedCandidate<'_>) -> Option<Vec<MatchedRange>> {
    greedy_ranges(pattern.mixedcase_bytes(), indexed.mixedcase_bytes, true)
}

fn lowercase_greedy(pattern: &Pattern, indexed: &IndexedCandidate<'_>) -> Option<Vec<MatchedRange>> {
    greedy_ranges(pattern.lowercase_bytes(), &indexed.lowercase_bytes, false)
}

/// Walk candidate tokens, consuming leading bytes of the pattern one token
/// at a time. Only attempted for patterns of length >= 3 on content types
/// that opt in.
fn acronym(pattern: &Pattern, indexed: &IndexedCandidate<'_>) -> Option<Vec<MatchedRange>> {
    let profile = crate::config::content_type_profile(indexed.content_type);
    if pattern.len() < 3 || !profile.eligible_for_acronym || !indexed.tokenization.has_non_uppercase_non_delimiter_bytes {
        return None;
    }

    let needle = pattern.lowercase_bytes();
    let tokenization = &indexed.tokenization;
    let last_eligible_token = if profile.acronym_must_be_in_base_name {
        tokenization.first_non_base_name_token_index
    } else {
        tokenization.tokens.len()
    };

    let mut ranges: Vec<MatchedRange> = Vec::new();
    let mut p = 0usize;
    let mut byte_cursor = 0usize;

    for (token_index, token) in tokenization.tokens.iter().enumerate() {
        if token_index >= last_eligible_token || p >= needle.len() {
            break;
        }
        let token_start = byte_cursor;
        let token_bytes = &indexed.lowercase_bytes[token_start..token_start + token.length];

        // a single-byte delimiter token (e.g. an underscore) can be skipped
        // entirely without consuming a pattern byte.
        if token.length == 1 && !token_bytes[0].is_ascii_alphanumeric() {
            byte_cursor += token.length;
            continue;
        }

        let allow_multi_char = token.all_uppercase
            || (profile.acronym_allows_multi_char_after_base_name
                && token_index >= tokenization.first_non_base_name_token_index);

        let mut consumed = 0usize;
        for (i, &tb) in token_bytes.iter().enumerate() {
            if p >= needle.len() || tb != needle[p] {
                break;
            }
            p += 1;
            consumed = i + 1;
            if !allow_multi_char {
                break;
            }
        }

        if consumed > 0 {
            ranges.push(MatchedRange {
                lo: token_start,
                hi: token_start + consumed,
            });
        } else if !(token_index == 0 && token.all_uppercase) {
            // every other token must contribute at least its leading byte;
            // only a leading all-uppercase token may be skipped untouched.
            return None;
        }

        byte_cursor += token.length;
    }

    if p == needle.len() { Some(ranges) } else { None }
}

/// Try the five match styles in order, returning the first that succeeds.
pub(crate) fn fast_match(
    pattern: &Pattern,
    indexed: &IndexedCandidate<'_>,
) -> Option<(Vec<MatchedRange>, MatchStyle)> {
    if let Some(r) = lowercase_continuous(pattern, indexed) {
        return Some((r, MatchStyle::LowercaseContinuous));
    }
    if let Some(r) = acronym(pattern, indexed) {
        return Some((r, MatchStyle::Acronym));
    }
    if let Some(r) = mixedcase_continuous(pattern, indexed) {
        return Some((r, MatchStyle::MixedcaseContinuous));
    }
    if let Some(r) = mixedcase_greedy(pattern, indexed) {
        return Some((r, MatchStyle::MixedcaseGreedy));
    }
    if let Some(r) = lowercase_greedy(pattern, indexed) {
        return Some((r, MatchStyle::LowercaseGreedy));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::CandidateBatch;
    use crate::token::ContentType;

    fn indexed_for<'a>(batch: &'a CandidateBatch, i: usize) -> IndexedCandidate<'a> {
        IndexedCandidate::new(batch.candidate_at(i), 0)
    }

    #[test]
    fn lowercase_continuous_finds_substring() {
        let mut batch = CandidateBatch::new(16);
        batch.append(b"filename", ContentType::Unknown);
        let indexed = indexed_for(&batch, 0);
        let p = Pattern::new("name");
        let ranges = lowercase_continuous(&p, &indexed).unwrap();
        assert_eq!(ranges, vec![MatchedRange { lo: 4, hi: 8 }]);
    }

    #[test]
    fn acronym_matches_capitals() {
        let mut batch = CandidateBatch::new(64);
        batch.append(b"translatesAutoresizingMaskIntoConstraints", ContentType::CodeCompletionSymbol);
        let indexed = indexed_for(&batch, 0);
        let p = Pattern::new("tamic");
        let ranges = acronym(&p, &indexed);
        assert!(ranges.is_some());
    }

    #[test]
    fn acronym_requires_minimum_length() {
        let mut batch = CandidateBatch::new(16);
        batch.append(b"AbCd", ContentType::CodeCompletionSymbol);
        let indexed = indexed_for(&batch, 0);
        let p = Pattern::new("ac");
        assert!(acronym(&p, &indexed).is_none());
    }

    #[test]
    fn greedy_matches_preserve_order() {
        let mut batch = CandidateBatch::new(16);
        batch.append(b"decoynamedecoy", ContentType::Unknown);
        let indexed = indexed_for(&batch, 0);
        let p = Pattern::new("name");
        assert!(lowercase_greedy(&p, &indexed).is_some());
    }
}
