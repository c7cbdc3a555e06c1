use serde::{Deserialize, Serialize};
use std::fmt;

use super::mark::ScoreError;

/// Which judgments count towards an item's marks.
///
/// Fixed per item by the rubric. There is no variant where both judgments are
/// ignored, so that combination cannot be expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemMode {
    /// Quality is not applicable: availability alone decides.
    AvailabilityOnly,
    /// Availability is not applicable: quality alone decides.
    QualityOnly,
    /// Both apply and are blended by the weights.
    #[default]
    Weighted,
}

impl ItemMode {
    /// Build a mode from the two "not applicable" flags.
    ///
    /// Quality N/A takes precedence over availability N/A. Both set at once is
    /// rejected.
    pub fn from_flags(quality_is_na: bool, availability_is_na: bool) -> Result<Self, ScoreError> {
        match (quality_is_na, availability_is_na) {
            (true, true) => Err(ScoreError::InvalidInput(
                "availability and quality cannot both be not applicable".to_string(),
            )),
            (true, false) => Ok(ItemMode::AvailabilityOnly),
            (false, true) => Ok(ItemMode::QualityOnly),
            (false, false) => Ok(ItemMode::Weighted),
        }
    }

    /// Returns `(quality_is_na, availability_is_na)`.
    pub fn flags(self) -> (bool, bool) {
        match self {
            ItemMode::AvailabilityOnly => (true, false),
            ItemMode::QualityOnly => (false, true),
            ItemMode::Weighted => (false, false),
        }
    }

    pub fn asks_availability(self) -> bool {
        !matches!(self, ItemMode::QualityOnly)
    }

    pub fn asks_quality(self) -> bool {
        !matches!(self, ItemMode::AvailabilityOnly)
    }
}

impl fmt::Display for ItemMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ItemMode::AvailabilityOnly => "availability only",
            ItemMode::QualityOnly => "quality only",
            ItemMode::Weighted => "weighted",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flags() {
        assert_eq!(ItemMode::from_flags(true, false).unwrap(), ItemMode::AvailabilityOnly);
        assert_eq!(ItemMode::from_flags(false, true).unwrap(), ItemMode::QualityOnly);
        assert_eq!(ItemMode::from_flags(false, false).unwrap(), ItemMode::Weighted);
        assert!(ItemMode::from_flags(true, true).is_err());
    }

    #[test]
    fn test_flags_inverse_of_from_flags() {
        for mode in [ItemMode::AvailabilityOnly, ItemMode::QualityOnly, ItemMode::Weighted] {
            let (q, a) = mode.flags();
            assert_eq!(ItemMode::from_flags(q, a).unwrap(), mode);
        }
    }

    #[test]
    fn test_yaml_names() {
        let mode: ItemMode = serde_saphyr::from_str("availability-only").unwrap();
        assert_eq!(mode, ItemMode::AvailabilityOnly);
        let mode: ItemMode = serde_saphyr::from_str("quality-only").unwrap();
        assert_eq!(mode, ItemMode::QualityOnly);
    }
}
