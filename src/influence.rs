//! Contextual scoring boost from "influencing" identifiers — words expected
//! to appear near the right answer (e.g. enclosing-scope names).

use crate::token::{ContentType, Tokenization, Tokenizer};

/// One influencing identifier, already split into tokens.
pub type TokenizedIdentifier = Vec<String>;

/// Split raw identifiers into tokens usable as influence input.
///
/// When `filter_low_signal` is set, tokens shorter than four ASCII bytes and
/// the words `"from"`/`"with"` are dropped — these carry little
/// discriminating power as influence anchors.
pub fn tokenize_influencing(identifiers: &[String], filter_low_signal: bool) -> Vec<TokenizedIdentifier> {
    identifiers
        .iter()
        .map(|identifier| {
            let tokenization = Tokenizer::tokenize(identifier.as_bytes(), ContentType::Unknown);
            let mut tokens = Vec::with_capacity(tokenization.tokens.len());
            let mut cursor = 0usize;
            for token in &tokenization.tokens {
                let text = &identifier[cursor..cursor + token.length];
                cursor += token.length;
                let keep = !filter_low_signal
                    || (text.len() >= 4 && !matches!(text.to_ascii_lowercase().as_str(), "from" | "with"));
                if keep {
                    tokens.push(text.to_string());
                }
            }
            tokens
        })
        .collect()
}

fn token_equal_ci(a: &str, b: &[u8]) -> bool {
    let a = a.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    if a[0].to_ascii_lowercase() != b[0].to_ascii_lowercase() {
        return false;
    }
    a.iter().zip(b).all(|(x, y)| x.to_ascii_lowercase() == y.to_ascii_lowercase())
}

fn candidate_tokens<'a>(bytes: &'a [u8], tokenization: &Tokenization) -> Vec<&'a [u8]> {
    let mut out = Vec::with_capacity(tokenization.tokens.len());
    let mut cursor = 0usize;
    for token in &tokenization.tokens {
        out.push(&bytes[cursor..cursor + token.length]);
        cursor += token.length;
    }
    out
}

fn identifier_score(identifier: &TokenizedIdentifier, candidate_tokens: &[&[u8]]) -> f64 {
    let n = identifier.len();
    if n == 0 {
        return 0.0;
    }
    let matched = identifier
        .iter()
        .filter(|tok| candidate_tokens.iter().any(|ct| token_equal_ci(tok, ct)))
        .count();

    if matched == 0 {
        0.0
    } else if n == 1 {
        1.0
    } else {
        0.75 + (matched - 1) as f64 / (n - 1) as f64 * 0.25
    }
}

/// Scores candidates against a weighted list of influencing identifiers,
/// most-relevant first.
pub struct InfluenceScorer<'a> {
    identifiers: &'a [TokenizedIdentifier],
}

impl<'a> InfluenceScorer<'a> {
    /// Build a scorer over `identifiers`, ordered most-relevant first; later
    /// identifiers are given a linearly decreasing weight.
    pub fn new(identifiers: &'a [TokenizedIdentifier]) -> Self {
        InfluenceScorer { identifiers }
    }

    fn weight(&self, index: usize) -> f64 {
        let count = self.identifiers.len();
        if count <= 1 {
            1.0
        } else {
            1.0 - 0.0625 * (index as f64 / (count - 1) as f64)
        }
    }

    /// Score `candidate_bytes` against every influencer, returning the best
    /// (weighted) match, in `[0, 1]`.
    pub fn score(&self, candidate_bytes: &[u8], content_type: ContentType) -> f64 {
        if self.identifiers.is_empty() {
            return 0.0;
        }
        let tokenization = Tokenizer::tokenize(candidate_bytes, content_type);
        let tokens = candidate_tokens(candidate_bytes, &tokenization);

        self.identifiers
            .iter()
            .enumerate()
            .map(|(i, identifier)| identifier_score(identifier, &tokens) * self.weight(i))
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_single_token_match_scores_one() {
        let identifiers = tokenize_influencing(&["data".to_string()], false);
        let scorer = InfluenceScorer::new(&identifiers);
        assert_eq!(scorer.score(b"loadData", ContentType::CodeCompletionSymbol), 1.0);
    }

    #[test]
    fn no_overlap_scores_zero() {
        let identifiers = tokenize_influencing(&["data".to_string()], false);
        let scorer = InfluenceScorer::new(&identifiers);
        assert_eq!(scorer.score(b"loadFile", ContentType::CodeCompletionSymbol), 0.0);
    }

    #[test]
    fn partial_multi_token_overlap_is_between_075_and_1() {
        let identifiers = tokenize_influencing(&["userDataLoader".to_string()], false);
        let scorer = InfluenceScorer::new(&identifiers);
        let s = scorer.score(b"loadUserData", ContentType::CodeCompletionSymbol);
        assert!(s > 0.0 && s < 1.0);
    }

    #[test]
    fn later_identifiers_are_tapered() {
        let identifiers = tokenize_influencing(&["data".to_string(), "data".to_string()], false);
        let scorer = InfluenceScorer::new(&identifiers);
        assert!(scorer.weight(1) < scorer.weight(0));
    }

    #[test]
    fn low_signal_tokens_are_filtered() {
        let tokenized = tokenize_influencing(&["loadDataFromAPI".to_string()], true);
        assert!(!tokenized[0].iter().any(|t| t.eq_ignore_ascii_case("from")));
    }
}
