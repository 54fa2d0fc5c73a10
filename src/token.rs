//! Splits an identifier's bytes into tokens (camelCase / delimiter runs) and
//! builds the per-byte back-references used by the scorer.

use derive_more::Debug;

/// The kind of content a candidate's bytes represent, driving several
/// scoring tables (see [`crate::config::ContentTypeProfile`]).
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum ContentType {
    /// A symbol offered by code completion (e.g. a method or property name).
    CodeCompletionSymbol,
    /// A file name, possibly with a path and extension.
    FileName,
    /// A symbol discovered by indexing a project (declarations, etc.).
    ProjectSymbol,
    /// Content with no special structure assumed.
    Unknown,
}

impl ContentType {
    /// The byte that separates a "base name" from the remainder of the
    /// identifier for this content type, if any.
    pub fn base_name_separator(self) -> Option<u8> {
        match self {
            ContentType::CodeCompletionSymbol | ContentType::ProjectSymbol => Some(b'('),
            ContentType::FileName => Some(b'.'),
            ContentType::Unknown => None,
        }
    }

    /// Whether the base name is the first occurrence of the separator
    /// (symbols) or the last (file names, which may have several dots).
    pub fn base_name_affinity(self) -> BaseNameAffinity {
        match self {
            ContentType::CodeCompletionSymbol | ContentType::ProjectSymbol => {
                BaseNameAffinity::First
            }
            ContentType::FileName | ContentType::Unknown => BaseNameAffinity::Last,
        }
    }

    /// Guess a content type from a short hint label, for callers that only
    /// have a loose label (e.g. from a request's metadata) rather than a
    /// [`ContentType`] directly. Anything unrecognized maps to `Unknown`.
    pub fn from_label(label: &str) -> ContentType {
        crate::exhaustive_match! {
            label => ContentType;
            {
                "symbol" => CodeCompletionSymbol,
                "file" => FileName,
                "project" => ProjectSymbol,
                "unknown" => Unknown,
            }
            default _ => Unknown
        }
    }
}

/// Whether a base-name separator locks in on first or last occurrence.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum BaseNameAffinity {
    /// Lock onto the first occurrence (symbols: the `(` opens the
    /// parameter list once).
    First,
    /// Keep updating on every occurrence (file names: each `.` could start
    /// a new, more specific extension).
    Last,
}

/// A single token: a maximal run of bytes produced by one pass of the
/// tokenizer's boundary rules.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Token {
    /// Number of bytes in this token.
    pub length: usize,
    /// Whether every alphabetic byte in this token is uppercase (acronym-like
    /// runs such as `URL` or `NS`).
    pub all_uppercase: bool,
}

/// The `(token_index, index_in_token)` address of a single byte.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ByteTokenAddress {
    /// Index into [`Tokenization::tokens`].
    pub token_index: usize,
    /// Offset of this byte within that token.
    pub index_in_token: usize,
}

/// The result of tokenizing one identifier's bytes.
#[derive(Clone, Debug)]
pub struct Tokenization {
    /// Ordered, non-empty tokens covering every byte of the input exactly
    /// once.
    pub tokens: Vec<Token>,
    /// Per-byte back-reference into `tokens`.
    pub byte_token_addresses: Vec<ByteTokenAddress>,
    /// Index one past the end of the "base name" region, or the full length
    /// if this content type doesn't recognize a separator.
    pub base_name_length: usize,
    /// Index of the first token that starts at or after `base_name_length`.
    pub first_non_base_name_token_index: usize,
    /// Whether any byte is neither uppercase nor a delimiter (i.e. the
    /// identifier has "ordinary" lowercase/digit content somewhere).
    pub has_non_uppercase_non_delimiter_bytes: bool,
}

impl Tokenization {
    /// Total number of bytes covered.
    pub fn byte_count(&self) -> usize {
        self.byte_token_addresses.len()
    }
}

#[derive(Copy, Clone, Eq, PartialEq)]
enum ByteClass {
    Uppercase,
    Delimiter,
    Other,
}

#[inline]
fn classify(b: u8) -> ByteClass {
    if b.is_ascii_uppercase() {
        ByteClass::Uppercase
    } else if b.is_ascii_alphanumeric() {
        ByteClass::Other
    } else {
        ByteClass::Delimiter
    }
}

/// Splits candidate bytes into a [`Tokenization`].
pub struct Tokenizer;

impl Tokenizer {
    /// Tokenize `bytes` under the boundary rules for `content_type`.
    pub fn tokenize(bytes: &[u8], content_type: ContentType) -> Tokenization {
        let len = bytes.len();
        if len == 0 {
            return Tokenization {
                tokens: Vec::new(),
                byte_token_addresses: Vec::new(),
                base_name_length: 0,
                first_non_base_name_token_index: 0,
                has_non_uppercase_non_delimiter_bytes: false,
            };
        }

        let classes: Vec<ByteClass> = bytes.iter().map(|&b| classify(b)).collect();

        let base_name_length = match content_type.base_name_separator() {
            None => len,
            Some(sep) => match content_type.base_name_affinity() {
                BaseNameAffinity::First => memchr::memchr(sep, bytes).unwrap_or(len),
                BaseNameAffinity::Last => memchr::memrchr(sep, bytes).unwrap_or(len),
            },
        };

        let mut tokens: Vec<Token> = Vec::new();
        let mut byte_token_addresses: Vec<ByteTokenAddress> = Vec::with_capacity(len);
        let mut has_non_uppercase_non_delimiter_bytes = false;

        let mut token_start = 0usize;
        let mut current_all_uppercase = true;

        let mut push_token = |tokens: &mut Vec<Token>, start: usize, end: usize, all_upper: bool| {
            tokens.push(Token {
                length: end - start,
                all_uppercase: all_upper,
            });
        };

        for i in 0..len {
            let class = classes[i];
            if class == ByteClass::Other {
                has_non_uppercase_non_delimiter_bytes = true;
            }

            let is_boundary = if i == 0 {
                false
            } else {
                let prev = classes[i - 1];
                let next = classes.get(i + 1).copied();
                let uppercase_boundary = class == ByteClass::Uppercase
                    && (prev == ByteClass::Other || next == Some(ByteClass::Other));
                let delimiter_boundary = class == ByteClass::Delimiter || prev == ByteClass::Delimiter;
                uppercase_boundary || delimiter_boundary
            };

            if is_boundary {
                push_token(&mut tokens, token_start, i, current_all_uppercase);
                token_start = i;
                current_all_uppercase = true;
            }

            if class != ByteClass::Uppercase {
                current_all_uppercase = false;
            }

            let token_index = tokens.len();
            byte_token_addresses.push(ByteTokenAddress {
                token_index,
                index_in_token: i - token_start,
            });
        }
        push_token(&mut tokens, token_start, len, current_all_uppercase);

        // fix up token_index for the final run recorded before its token was
        // pushed: all addresses referencing the last (still-open) token index
        // already point at `tokens.len() - 1` post-push, so nothing to patch.

        let first_non_base_name_token_index = if base_name_length < len {
            byte_token_addresses[base_name_length].token_index
        } else {
            tokens.len()
        };

        Tokenization {
            tokens,
            byte_token_addresses,
            base_name_length,
            first_non_base_name_token_index,
            has_non_uppercase_non_delimiter_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(s: &str, ct: ContentType) -> Tokenization {
        Tokenizer::tokenize(s.as_bytes(), ct)
    }

    #[test]
    fn empty_input_has_no_tokens() {
        let t = tok("", ContentType::Unknown);
        assert!(t.tokens.is_empty());
        assert_eq!(t.byte_count(), 0);
    }

    #[test]
    fn single_byte_is_one_token() {
        let t = tok("x", ContentType::Unknown);
        assert_eq!(t.tokens.len(), 1);
        assert_eq!(t.tokens[0].length, 1);
    }

    #[test]
    fn camel_case_splits_on_capital_after_lowercase() {
        let t = tok("fooBar", ContentType::Unknown);
        assert_eq!(t.tokens.len(), 2);
        assert_eq!(t.tokens[0].length, 3); // foo
        assert_eq!(t.tokens[1].length, 3); // Bar
    }

    #[test]
    fn acronym_run_stays_one_token() {
        let t = tok("NSURL", ContentType::Unknown);
        assert_eq!(t.tokens.len(), 1);
        assert!(t.tokens[0].all_uppercase);
    }

    #[test]
    fn acronym_then_lowercase_splits_before_last_capital() {
        let t = tok("URLfoo", ContentType::Unknown);
        assert_eq!(t.tokens.len(), 2);
        assert_eq!(t.tokens[0].length, 3); // URL
        assert_eq!(t.tokens[1].length, 3); // foo
    }

    #[test]
    fn delimiters_are_their_own_tokens() {
        let t = tok("foo_bar", ContentType::Unknown);
        assert_eq!(t.tokens.len(), 3);
        assert_eq!(t.tokens[1].length, 1); // underscore
    }

    #[test]
    fn token_partition_covers_every_byte_exactly_once() {
        for s in ["fooBarBaz", "NSURLConnection", "a.b.c", "ViewController.swift"] {
            let t = tok(s, ContentType::FileName);
            let total: usize = t.tokens.iter().map(|tok| tok.length).sum();
            assert_eq!(total, s.len());
            for (i, addr) in t.byte_token_addresses.iter().enumerate() {
                assert!(addr.index_in_token < t.tokens[addr.token_index].length, "byte {i} in {s}");
            }
        }
    }

    #[test]
    fn base_name_symbol_locks_on_first_paren() {
        let t = tok("foo(bar(baz", ContentType::CodeCompletionSymbol);
        assert_eq!(t.base_name_length, 3);
    }

    #[test]
    fn base_name_filename_locks_on_last_dot() {
        let t = tok("archive.tar.gz", ContentType::FileName);
        assert_eq!(t.base_name_length, 11); // "archive.tar"
    }

    #[test]
    fn from_label_recognizes_known_hints() {
        assert_eq!(ContentType::from_label("file"), ContentType::FileName);
        assert_eq!(ContentType::from_label("nonsense"), ContentType::Unknown);
    }

    #[test]
    fn base_name_unknown_has_no_separator() {
        let t = tok("anything", ContentType::Unknown);
        assert_eq!(t.base_name_length, t.byte_count());
        assert_eq!(t.first_non_base_name_token_index, t.tokens.len());
    }
}
