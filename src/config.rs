//! Tunable scoring constants and the per-[`ContentType`] parameter table.

use crate::token::{BaseNameAffinity, ContentType};

/// Per-content-type weights driving several terms in [`crate::matcher::score::single_score`].
#[derive(Copy, Clone, Debug)]
pub struct ContentTypeProfile {
    /// Multiplier applied when the sole matched range starts at byte 0.
    pub prefix_match_bonus: f64,
    /// Multiplier applied when one range covers the entire candidate.
    pub full_match_bonus: f64,
    /// Multiplier applied when one range exactly covers the base name.
    pub full_base_name_match_bonus: f64,
    /// Whether the base name is the first or last separator occurrence.
    pub base_name_affinity: BaseNameAffinity,
    /// The byte that separates the base name from the rest, if any.
    pub base_name_separator: Option<u8>,
    /// Whether the acronym match style is attempted for this content type.
    pub eligible_for_acronym: bool,
    /// Whether acronym tokens after the base name may consume more than one
    /// leading byte per token.
    pub acronym_allows_multi_char_after_base_name: bool,
    /// Whether acronym matches must stay within the base name.
    pub acronym_must_be_in_base_name: bool,
    /// Whether content after the base name is considered low-signal (e.g. a
    /// file extension) for the purposes of case-match accounting.
    pub content_after_base_name_is_trivial: bool,
    /// Whether a prefix match that also looks like a type name should get
    /// the extra [`ScoringConfig::local_variable_to_global_type_score_ratio`]
    /// multiplier.
    pub eligible_for_type_name_over_local_variable: bool,
}

const CODE_COMPLETION_SYMBOL_PROFILE: ContentTypeProfile = ContentTypeProfile {
    prefix_match_bonus: 2.00,
    full_match_bonus: 1.00,
    full_base_name_match_bonus: 1.00,
    base_name_affinity: BaseNameAffinity::First,
    base_name_separator: Some(b'('),
    eligible_for_acronym: true,
    acronym_allows_multi_char_after_base_name: false,
    acronym_must_be_in_base_name: true,
    content_after_base_name_is_trivial: false,
    eligible_for_type_name_over_local_variable: true,
};

const FILE_NAME_PROFILE: ContentTypeProfile = ContentTypeProfile {
    prefix_match_bonus: 1.05,
    full_match_bonus: 1.50,
    full_base_name_match_bonus: 1.50,
    base_name_affinity: BaseNameAffinity::Last,
    base_name_separator: Some(b'.'),
    eligible_for_acronym: true,
    acronym_allows_multi_char_after_base_name: true,
    acronym_must_be_in_base_name: false,
    content_after_base_name_is_trivial: true,
    eligible_for_type_name_over_local_variable: false,
};

const PROJECT_SYMBOL_PROFILE: ContentTypeProfile = ContentTypeProfile {
    prefix_match_bonus: 1.05,
    full_match_bonus: 1.50,
    full_base_name_match_bonus: 1.50,
    base_name_affinity: BaseNameAffinity::First,
    base_name_separator: Some(b'('),
    eligible_for_acronym: true,
    acronym_allows_multi_char_after_base_name: false,
    acronym_must_be_in_base_name: true,
    content_after_base_name_is_trivial: false,
    eligible_for_type_name_over_local_variable: false,
};

const UNKNOWN_PROFILE: ContentTypeProfile = ContentTypeProfile {
    prefix_match_bonus: 2.00,
    full_match_bonus: 1.00,
    full_base_name_match_bonus: 1.00,
    base_name_affinity: BaseNameAffinity::Last,
    base_name_separator: None,
    eligible_for_acronym: false,
    acronym_allows_multi_char_after_base_name: false,
    acronym_must_be_in_base_name: false,
    content_after_base_name_is_trivial: false,
    eligible_for_type_name_over_local_variable: false,
};

/// Look up the static parameter row for `content_type`.
///
/// `assert_enum_variants!` forces a compile error if [`ContentType`] ever
/// grows a variant without a matching arm here.
pub fn content_type_profile(content_type: ContentType) -> &'static ContentTypeProfile {
    assert_enum_variants::assert_enum_variants!(
        ContentType,
        { CodeCompletionSymbol, FileName, ProjectSymbol, Unknown }
    );
    match content_type {
        ContentType::CodeCompletionSymbol => &CODE_COMPLETION_SYMBOL_PROFILE,
        ContentType::FileName => &FILE_NAME_PROFILE,
        ContentType::ProjectSymbol => &PROJECT_SYMBOL_PROFILE,
        ContentType::Unknown => &UNKNOWN_PROFILE,
    }
}

/// Best (lowest) text score the collator will still reject outright,
/// indexed by `min(pattern_utf8_length, 10)`.
pub const BEST_REJECTED_TEXT_SCORE_BY_PATTERN_LENGTH: [f64; 11] = [
    0.0,
    0.0,
    2.900_400_881_379_344,
    2.900_400_881_379_344,
    2.900_400_881_379_344,
    2.900_400_881_379_344,
    2.900_400_881_379_344,
    2.900_400_881_379_344,
    2.900_400_881_379_344,
    2.900_400_881_379_344,
    2.900_400_881_379_344,
];

/// Tunable knobs for scoring and selection, collected into one struct built
/// via chained setters (mirroring this crate's own small-builder style).
#[derive(Copy, Clone, Debug)]
pub struct ScoringConfig {
    /// Cycle budget for the thorough backtracking search, per candidate.
    pub thorough_search_budget: u32,
    /// Maximum `false_starts` the collator will tolerate before rejecting a
    /// candidate outright.
    pub max_false_starts: u32,
    /// Pattern length at and above which the collator always rescores with
    /// thorough precision regardless of candidate count.
    pub minimum_pattern_length_to_always_rescore_with_thorough_precision: usize,
    /// Default cap on how many candidates get the expensive thorough
    /// rescoring pass.
    pub default_maximum_number_of_items_for_expensive_selection: usize,
    /// Maximum multiplicative bonus influence scoring may contribute.
    pub max_influence_bonus: f64,
    /// Extra multiplier applied to prefix matches that also look like type
    /// names, for content types where that distinction matters. Must be > 1.
    pub local_variable_to_global_type_score_ratio: f64,
}

impl ScoringConfig {
    /// Cycle budget for thorough search.
    pub fn thorough_search_budget(mut self, v: u32) -> Self {
        self.thorough_search_budget = v;
        self
    }

    /// Max tolerated false starts.
    pub fn max_false_starts(mut self, v: u32) -> Self {
        self.max_false_starts = v;
        self
    }

    /// Pattern-length thorough-rescore threshold.
    pub fn minimum_pattern_length_to_always_rescore_with_thorough_precision(mut self, v: usize) -> Self {
        self.minimum_pattern_length_to_always_rescore_with_thorough_precision = v;
        self
    }

    /// Cap on expensive-selection candidate count.
    pub fn default_maximum_number_of_items_for_expensive_selection(mut self, v: usize) -> Self {
        self.default_maximum_number_of_items_for_expensive_selection = v;
        self
    }

    /// Max influence bonus multiplier component.
    pub fn max_influence_bonus(mut self, v: f64) -> Self {
        self.max_influence_bonus = v;
        self
    }

    /// Local-variable-vs-type score ratio; must stay above 1.0.
    pub fn local_variable_to_global_type_score_ratio(mut self, v: f64) -> Self {
        self.local_variable_to_global_type_score_ratio = v;
        self
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            thorough_search_budget: 5000,
            max_false_starts: 2,
            minimum_pattern_length_to_always_rescore_with_thorough_precision: 2,
            default_maximum_number_of_items_for_expensive_selection: 100,
            max_influence_bonus: 0.10,
            local_variable_to_global_type_score_ratio: 1.5,
        }
    }
}
