use std::time::Duration;

use crate::{Gender, InductionError};

/// How nouns are weighted when suffix statistics are collected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MorphoStatistics {
    /// Every noun counts once.
    Type,
    /// Every noun counts as many times as it occurs in the corpus.
    Token,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum MorphologyModel {
    /// Gender distribution of labeled nouns sharing the last `suffix_length` characters.
    FixedSuffix,
    /// Reversed-character trie interpolating every suffix length, with the
    /// smoothing parameters controlling how much weight deeper nodes get.
    SmoothedTrie { alpha: f64, beta: f64 },
}

/// Gender handed to every noun the earlier stages could not label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Fallback {
    Fixed(Gender),
    /// The gender most often induced so far.
    MostFrequent,
}

/// Hyperparameters of one induction run. Passed read-only into every stage
/// and copied into every snapshot.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InductionConfig {
    pub seeds_per_gender: usize,
    /// `None` runs bootstrapping until a round assigns nothing.
    pub max_rounds: Option<usize>,
    /// Wall-clock budget checked before each bootstrapping round.
    pub time_budget_secs: Option<f64>,
    pub confidence_threshold: f64,
    pub margin_threshold: f64,
    pub suffix_length: usize,
    pub morphology_threshold: f64,
    pub morphology_model: MorphologyModel,
    pub morpho_statistics: MorphoStatistics,
    pub fallback: Fallback,
    /// Coverage below this before default assignment is flagged in the final snapshot.
    pub low_coverage_warning: f64,
}

impl Default for InductionConfig {
    fn default() -> Self {
        Self {
            seeds_per_gender: 15,
            max_rounds: None,
            time_budget_secs: None,
            confidence_threshold: 0.4,
            margin_threshold: 0.0,
            suffix_length: 3,
            morphology_threshold: 0.5,
            morphology_model: MorphologyModel::FixedSuffix,
            morpho_statistics: MorphoStatistics::Token,
            fallback: Fallback::Fixed(Gender::Feminine),
            low_coverage_warning: 0.05,
        }
    }
}

impl InductionConfig {
    pub fn validate(&self) -> Result<(), InductionError> {
        let unit_interval = [
            ("confidence_threshold", self.confidence_threshold),
            ("margin_threshold", self.margin_threshold),
            ("morphology_threshold", self.morphology_threshold),
            ("low_coverage_warning", self.low_coverage_warning),
        ];
        for (name, value) in unit_interval {
            if !(0.0..=1.0).contains(&value) {
                return Err(InductionError::InvalidConfig(format!(
                    "{name} must lie in [0, 1], got {value}"
                )));
            }
        }

        if self.seeds_per_gender == 0 {
            return Err(InductionError::InvalidConfig(
                "seeds_per_gender must be at least 1".to_string(),
            ));
        }
        if self.suffix_length == 0 {
            return Err(InductionError::InvalidConfig(
                "suffix_length must be at least 1".to_string(),
            ));
        }
        if let Some(secs) = self.time_budget_secs {
            if Duration::try_from_secs_f64(secs).is_err() {
                return Err(InductionError::InvalidConfig(format!(
                    "time_budget_secs must be a non-negative representable duration, got {secs}"
                )));
            }
        }
        if let MorphologyModel::SmoothedTrie { alpha, beta } = self.morphology_model {
            for (name, value) in [("alpha", alpha), ("beta", beta)] {
                if !(value > 0.0 && value <= 1.0) {
                    return Err(InductionError::InvalidConfig(format!(
                        "trie smoothing parameter {name} must lie in (0, 1], got {value}"
                    )));
                }
            }
        }

        Ok(())
    }

    /// `None` when unlimited. Unrepresentable budgets are rejected by [`Self::validate`].
    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(InductionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let config = InductionConfig {
            confidence_threshold: 1.5,
            ..InductionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(InductionError::InvalidConfig(message)) if message.contains("confidence_threshold")
        ));
    }

    #[test]
    fn test_rejects_zero_suffix_length() {
        let config = InductionConfig {
            suffix_length: 0,
            ..InductionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unrepresentable_time_budget() {
        for secs in [1e20, -1.0, f64::NAN, f64::INFINITY] {
            let config = InductionConfig {
                time_budget_secs: Some(secs),
                ..InductionConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(InductionError::InvalidConfig(message)) if message.contains("time_budget_secs")
            ));
        }

        let config = InductionConfig {
            time_budget_secs: Some(0.0),
            ..InductionConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.time_budget(), Some(Duration::ZERO));
    }

    #[test]
    fn test_rejects_bad_trie_parameters() {
        let config = InductionConfig {
            morphology_model: MorphologyModel::SmoothedTrie {
                alpha: 0.0,
                beta: 0.99,
            },
            ..InductionConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
