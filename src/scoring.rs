//! Difficulty tiers and the rule that keeps the regressor's score inside the
//! band of the classifier's tier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Highest score an easy problem may show; also the medium floor.
pub const EASY_CEILING: f64 = 3.33;
/// Highest score a medium problem may show.
pub const MEDIUM_CEILING: f64 = 6.66;
/// Lowest score a hard problem may show.
// 6.66 vs 6.67 is carried over from the trained dashboard; keep both.
pub const HARD_FLOOR: f64 = 6.67;

/// Difficulty class as stored in the dataset (`problem_class`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Easy,
    Medium,
    Hard,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Easy, Tier::Medium, Tier::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Easy => "easy",
            Tier::Medium => "medium",
            Tier::Hard => "hard",
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            Tier::Easy => "EASY",
            Tier::Medium => "MEDIUM",
            Tier::Hard => "HARD",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Tier::Easy => "#00C851",
            Tier::Medium => "#ffbb33",
            Tier::Hard => "#ff4444",
        }
    }

    /// Clamp a raw regressor score into this tier's band.
    pub fn clamp_score(self, raw: f64) -> f64 {
        match self {
            Tier::Easy => raw.min(EASY_CEILING),
            Tier::Medium => raw.min(MEDIUM_CEILING).max(EASY_CEILING),
            Tier::Hard => raw.max(HARD_FLOOR),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown difficulty class: {0:?}")]
pub struct UnknownTier(pub String);

impl FromStr for Tier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Tier::Easy),
            "medium" => Ok(Tier::Medium),
            "hard" => Ok(Tier::Hard),
            _ => Err(UnknownTier(s.to_string())),
        }
    }
}

/// Reconciled score plus everything the dashboard needs to render it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Verdict {
    pub tier: Tier,
    pub raw_score: f64,
    pub score: f64,
    pub display: &'static str,
    pub color: &'static str,
}

impl Verdict {
    /// Fraction for the progress bar (score / 10).
    pub fn progress(&self) -> f64 {
        self.score / 10.0
    }

    /// Score as shown on the dashboard, two decimals.
    pub fn score_text(&self) -> String {
        format!("{:.2}", self.score)
    }
}

/// Reconcile the classifier's tier with the regressor's raw score.
pub fn reconcile(tier: Tier, raw_score: f64) -> Verdict {
    Verdict {
        tier,
        raw_score,
        score: tier.clamp_score(raw_score),
        display: tier.display(),
        color: tier.color(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easy_is_capped() {
        let v = reconcile(Tier::Easy, 5.0);
        assert_eq!(v.score, 3.33);
        assert_eq!(v.display, "EASY");
        assert_eq!(v.color, "#00C851");
        assert_eq!(reconcile(Tier::Easy, 1.5).score, 1.5);
    }

    #[test]
    fn medium_is_banded() {
        assert_eq!(reconcile(Tier::Medium, 1.0).score, 3.33);
        assert_eq!(reconcile(Tier::Medium, 9.0).score, 6.66);
        assert_eq!(reconcile(Tier::Medium, 5.0).score, 5.0);
        assert_eq!(reconcile(Tier::Medium, 5.0).display, "MEDIUM");
    }

    #[test]
    fn hard_has_a_floor() {
        let v = reconcile(Tier::Hard, 2.0);
        assert_eq!(v.score, 6.67);
        assert_eq!(v.display, "HARD");
        assert_eq!(v.color, "#ff4444");
        assert_eq!(reconcile(Tier::Hard, 8.0).score, 8.0);
    }

    #[test]
    fn raw_score_is_kept() {
        assert_eq!(reconcile(Tier::Hard, 2.0).raw_score, 2.0);
    }

    #[test]
    fn display_helpers() {
        let v = reconcile(Tier::Medium, 4.5);
        assert_eq!(v.score_text(), "4.50");
        assert!((v.progress() - 0.45).abs() < 1e-12);
    }

    #[test]
    fn parses_dataset_labels() {
        assert_eq!("easy".parse::<Tier>(), Ok(Tier::Easy));
        assert_eq!(" Hard ".parse::<Tier>(), Ok(Tier::Hard));
        assert!("impossible".parse::<Tier>().is_err());
    }

    #[test]
    fn serde_uses_lowercase() {
        assert_eq!(serde_json::to_string(&Tier::Medium).unwrap(), "\"medium\"");
        let t: Tier = serde_json::from_str("\"hard\"").unwrap();
        assert_eq!(t, Tier::Hard);
    }
}
