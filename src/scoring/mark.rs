use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors raised by the scoring functions.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreError {
    /// A judgment, weight or mark allocation outside its allowed domain.
    InvalidInput(String),
    /// The evaluation holds an item the rubric does not define.
    UnknownItem { section: String, item: String },
    /// The rubric defines an item the evaluation does not hold.
    MissingItem { section: String, item: String },
    /// The evaluation holds a section the rubric does not define.
    UnknownSection(String),
    /// The rubric defines a section the evaluation does not hold.
    MissingSection(String),
}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            ScoreError::UnknownItem { section, item } => {
                write!(f, "Item '{}' is not part of section '{}'", item, section)
            }
            ScoreError::MissingItem { section, item } => {
                write!(f, "Section '{}' has no answer slot for item '{}'", section, item)
            }
            ScoreError::UnknownSection(id) => write!(f, "Unknown section '{}'", id),
            ScoreError::MissingSection(id) => write!(f, "Evaluation is missing section '{}'", id),
        }
    }
}

impl std::error::Error for ScoreError {}

/// A yes/no judgment stored as 0 or 1.
///
/// Anything else is rejected when the value is captured, so the scoring
/// functions never see an out-of-range judgment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct BinaryMark(bool);

impl BinaryMark {
    pub const NO: BinaryMark = BinaryMark(false);
    pub const YES: BinaryMark = BinaryMark(true);

    pub fn is_yes(self) -> bool {
        self.0
    }

    pub fn value(self) -> u8 {
        self.0 as u8
    }
}

impl From<bool> for BinaryMark {
    fn from(value: bool) -> Self {
        BinaryMark(value)
    }
}

impl From<BinaryMark> for u8 {
    fn from(mark: BinaryMark) -> Self {
        mark.value()
    }
}

impl TryFrom<u8> for BinaryMark {
    type Error = ScoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(BinaryMark::NO),
            1 => Ok(BinaryMark::YES),
            other => Err(ScoreError::InvalidInput(format!(
                "judgment must be 0 or 1, got {}",
                other
            ))),
        }
    }
}

impl TryFrom<i64> for BinaryMark {
    type Error = ScoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(BinaryMark::NO),
            1 => Ok(BinaryMark::YES),
            other => Err(ScoreError::InvalidInput(format!(
                "judgment must be 0 or 1, got {}",
                other
            ))),
        }
    }
}

impl FromStr for BinaryMark {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" => Ok(BinaryMark::NO),
            "1" => Ok(BinaryMark::YES),
            other => Err(ScoreError::InvalidInput(format!(
                "judgment must be 0 or 1, got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for BinaryMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_from_accepts_binary() {
        assert_eq!(BinaryMark::try_from(0u8).unwrap(), BinaryMark::NO);
        assert_eq!(BinaryMark::try_from(1u8).unwrap(), BinaryMark::YES);
        assert_eq!(BinaryMark::try_from(1i64).unwrap(), BinaryMark::YES);
    }

    #[test]
    fn test_try_from_rejects_out_of_range() {
        assert!(matches!(
            BinaryMark::try_from(2u8),
            Err(ScoreError::InvalidInput(_))
        ));
        assert!(matches!(
            BinaryMark::try_from(-1i64),
            Err(ScoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_parse() {
        assert_eq!(" 1 ".parse::<BinaryMark>().unwrap(), BinaryMark::YES);
        assert_eq!("0".parse::<BinaryMark>().unwrap(), BinaryMark::NO);
        assert!("yes".parse::<BinaryMark>().is_err());
        assert!("0.5".parse::<BinaryMark>().is_err());
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&BinaryMark::YES).unwrap();
        assert_eq!(json, "1");
        let parsed: BinaryMark = serde_json::from_str("0").unwrap();
        assert_eq!(parsed, BinaryMark::NO);
    }

    #[test]
    fn test_deserialize_rejects_out_of_range() {
        let result: Result<BinaryMark, _> = serde_json::from_str("3");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("0 or 1"), "got: {}", err);
    }
}
