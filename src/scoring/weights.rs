use serde::{Deserialize, Serialize};

use super::mark::ScoreError;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Share of an item's marks given for availability and for quality.
///
/// Example YAML:
/// ```yaml
/// weights:
///   availability: 0.4
///   quality: 0.6
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Weights {
    pub availability: f64,
    pub quality: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            availability: 0.4,
            quality: 0.6,
        }
    }
}

impl Weights {
    pub fn new(availability: f64, quality: f64) -> Result<Self, ScoreError> {
        let weights = Self {
            availability,
            quality,
        };
        weights.validate()?;
        Ok(weights)
    }

    /// Both weights must be finite, non-negative and sum to 1.0, so that full
    /// marks need both judgments to be yes.
    pub fn validate(&self) -> Result<(), ScoreError> {
        for (name, value) in [("availability", self.availability), ("quality", self.quality)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ScoreError::InvalidInput(format!(
                    "{} weight must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        let sum = self.availability + self.quality;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ScoreError::InvalidInput(format!(
                "weights must sum to 1.0, got {}",
                sum
            )));
        }
        Ok(())
    }
}
