//! Complexity assessment heuristic
//!
//! Shared by the scenario generator (to tag expected complexity) and the
//! business-rule validator (to re-derive it), so both sides stay identical.
//!
//! The heuristic only ever yields [`Complexity::Medium`] or
//! [`Complexity::High`]. [`Complexity::Low`] exists for scenario tagging.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Keywords that mark an intent as high complexity
pub const HIGH_COMPLEXITY_KEYWORDS: &[&str] = &[
    "global",
    "international",
    "regulatory",
    "acquisition",
    "merger",
    "transformation",
    "crisis",
    "restructuring",
];

/// Distinct keyword matches needed for a high rating
pub const HIGH_COMPLEXITY_KEYWORD_THRESHOLD: usize = 2;

/// Combined text length (chars) above which an intent is high complexity
pub const HIGH_COMPLEXITY_LENGTH_THRESHOLD: usize = 150;

/// Complexity tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    /// Narrow, single-team objectives
    Low,
    /// Default tier
    Medium,
    /// Multi-domain, regulated or long-form objectives
    High,
}

impl Complexity {
    /// All tiers, lowest first
    pub const ALL: [Complexity; 3] = [Self::Low, Self::Medium, Self::High];

    /// Lowercase name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Complexity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown complexity: {other}")),
        }
    }
}

/// Assess complexity of an intent and its optional context
///
/// Lowercases `intent` and `context` joined by a single space, then rates
/// the text high when at least two distinct keywords of
/// [`HIGH_COMPLEXITY_KEYWORDS`] occur or the text is longer than
/// [`HIGH_COMPLEXITY_LENGTH_THRESHOLD`] characters. Everything else is medium.
#[must_use]
pub fn assess_complexity(intent: &str, context: Option<&str>) -> Complexity {
    let text = match context {
        Some(context) => format!("{intent} {context}"),
        None => intent.to_owned(),
    }
    .to_lowercase();

    let distinct_matches = HIGH_COMPLEXITY_KEYWORDS
        .iter()
        .filter(|keyword| text.contains(*keyword))
        .count();

    if distinct_matches >= HIGH_COMPLEXITY_KEYWORD_THRESHOLD
        || text.chars().count() > HIGH_COMPLEXITY_LENGTH_THRESHOLD
    {
        Complexity::High
    } else {
        Complexity::Medium
    }
}

/// Decision count a tier implies in auto mode
#[inline]
#[must_use]
pub fn complexity_target(complexity: Complexity) -> usize {
    match complexity {
        Complexity::High => 5,
        Complexity::Medium | Complexity::Low => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_distinct_keywords_are_high() {
        assert_eq!(
            assess_complexity("Global expansion under new regulatory regimes", None),
            Complexity::High
        );
    }

    #[test]
    fn repeated_single_keyword_stays_medium() {
        assert_eq!(
            assess_complexity("Global, global, global presence", None),
            Complexity::Medium
        );
    }

    #[test]
    fn keywords_in_context_count() {
        assert_eq!(
            assess_complexity("Plan the next acquisition", Some("Post-merger integration")),
            Complexity::High
        );
    }

    #[test]
    fn length_threshold_is_exclusive() {
        let at_threshold = "a".repeat(HIGH_COMPLEXITY_LENGTH_THRESHOLD);
        assert_eq!(assess_complexity(&at_threshold, None), Complexity::Medium);

        let over = "a".repeat(HIGH_COMPLEXITY_LENGTH_THRESHOLD + 1);
        assert_eq!(assess_complexity(&over, None), Complexity::High);
    }

    #[test]
    fn joining_space_counts_toward_length() {
        let intent = "a".repeat(100);
        let context = "b".repeat(50);
        // 100 + 1 + 50 = 151
        assert_eq!(assess_complexity(&intent, Some(&context)), Complexity::High);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(
            assess_complexity("CRISIS response during RESTRUCTURING", None),
            Complexity::High
        );
    }

    #[test]
    fn never_yields_low() {
        for intent in ["", "Improve onboarding", "Optimize a local process"] {
            assert_ne!(assess_complexity(intent, None), Complexity::Low);
        }
    }

    #[test]
    fn targets() {
        assert_eq!(complexity_target(Complexity::High), 5);
        assert_eq!(complexity_target(Complexity::Medium), 3);
        assert_eq!(complexity_target(Complexity::Low), 3);
    }

    #[test]
    fn parses_names() {
        assert_eq!("HIGH".parse::<Complexity>().unwrap(), Complexity::High);
        assert!("extreme".parse::<Complexity>().is_err());
    }
}
