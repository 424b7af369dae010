//! Pluggable string similarity used for fuzzy location correction.

use serde::{Deserialize, Serialize};
use similar::TextDiff;

/// Scores how alike two strings are, from `0.0` (nothing shared) to `1.0` (identical).
pub trait SimilarityMetric: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> f64;

    fn name(&self) -> &'static str;
}

/// Matching-characters ratio `2 * M / (len(a) + len(b))` over a character diff,
/// the score used by sequence matchers for close-match lookups.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceRatio;

impl SimilarityMetric for SequenceRatio {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        f64::from(TextDiff::from_chars(a, b).ratio())
    }

    fn name(&self) -> &'static str {
        "sequence_ratio"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedLevenshtein;

impl SimilarityMetric for NormalizedLevenshtein {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        strsim::normalized_levenshtein(a, b)
    }

    fn name(&self) -> &'static str {
        "normalized_levenshtein"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JaroWinkler;

impl SimilarityMetric for JaroWinkler {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        strsim::jaro_winkler(a, b)
    }

    fn name(&self) -> &'static str {
        "jaro_winkler"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SorensenDice;

impl SimilarityMetric for SorensenDice {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        strsim::sorensen_dice(a, b)
    }

    fn name(&self) -> &'static str {
        "sorensen_dice"
    }
}

/// Serializable selector for the built-in metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityKind {
    #[default]
    SequenceRatio,
    NormalizedLevenshtein,
    JaroWinkler,
    SorensenDice,
}

impl SimilarityKind {
    pub fn metric(&self) -> Box<dyn SimilarityMetric> {
        match self {
            Self::SequenceRatio => Box::new(SequenceRatio),
            Self::NormalizedLevenshtein => Box::new(NormalizedLevenshtein),
            Self::JaroWinkler => Box::new(JaroWinkler),
            Self::SorensenDice => Box::new(SorensenDice),
        }
    }
}

/// A candidate that cleared the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'a> {
    pub candidate: &'a str,
    pub score: f64,
}

/// Nearest-neighbour search over candidate strings.
pub struct FuzzyMatcher {
    metric: Box<dyn SimilarityMetric>,
    threshold: f64,
}

impl FuzzyMatcher {
    pub const DEFAULT_THRESHOLD: f64 = 0.6;

    pub fn new(metric: Box<dyn SimilarityMetric>, threshold: f64) -> Self {
        Self { metric, threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn metric_name(&self) -> &'static str {
        self.metric.name()
    }

    /// Highest-scoring candidate at or above the threshold.
    /// Ties keep the candidate that came first.
    pub fn best_match<'a, I>(&self, needle: &str, candidates: I) -> Option<Match<'a>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut best: Option<Match<'a>> = None;
        for candidate in candidates {
            let score = self.metric.similarity(needle, candidate);
            if score < self.threshold {
                continue;
            }
            match best {
                Some(current) if current.score >= score => {}
                _ => best = Some(Match { candidate, score }),
            }
        }
        best
    }
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(Box::new(SequenceRatio), Self::DEFAULT_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedScore(f64);

    impl SimilarityMetric for FixedScore {
        fn similarity(&self, _a: &str, _b: &str) -> f64 {
            self.0
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    #[test]
    fn picks_closest_candidate() {
        let matcher = FuzzyMatcher::default();
        let found = matcher
            .best_match("Germny", ["Guernsey", "Germany", "Finland"])
            .expect("close match");
        assert_eq!(found.candidate, "Germany");
        assert!(found.score > 0.8);
    }

    #[test]
    fn ties_resolve_to_first_candidate() {
        let matcher = FuzzyMatcher::new(Box::new(FixedScore(0.9)), 0.6);
        let found = matcher.best_match("x", ["first", "second"]).expect("match");
        assert_eq!(found.candidate, "first");
    }

    #[test]
    fn nothing_below_threshold_matches() {
        let matcher = FuzzyMatcher::new(Box::new(FixedScore(0.59)), 0.6);
        assert!(matcher.best_match("x", ["a", "b"]).is_none());
    }

    #[test]
    fn sequence_ratio_counts_matching_characters() {
        let ratio = SequenceRatio;
        assert!((ratio.similarity("Ireland", "Ireland(Rep.)") - 0.7).abs() < 1e-6);
        assert!((ratio.similarity("abcd", "abcd") - 1.0).abs() < 1e-6);
        assert!(ratio.similarity("abc", "xyz").abs() < 1e-6);
    }

    #[test]
    fn default_kind_is_sequence_ratio() {
        assert_eq!(SimilarityKind::default(), SimilarityKind::SequenceRatio);
        assert_eq!(FuzzyMatcher::default().metric_name(), "sequence_ratio");
    }

    #[test]
    fn metric_kinds_round_trip_through_json() {
        let kind: SimilarityKind = serde_json::from_str("\"jaro_winkler\"").expect("parse kind");
        assert_eq!(kind, SimilarityKind::JaroWinkler);
        assert_eq!(kind.metric().name(), "jaro_winkler");
    }
}
