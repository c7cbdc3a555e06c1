use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::scoring::ItemMode;

/// The kinds of inspection the tool knows how to score. Also used as the
/// type tag sent with a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvaluationKind {
    Infrastructure,
    It,
    Trades,
    Headteacher,
}

impl EvaluationKind {
    pub const ALL: [EvaluationKind; 4] = [
        EvaluationKind::Infrastructure,
        EvaluationKind::It,
        EvaluationKind::Trades,
        EvaluationKind::Headteacher,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EvaluationKind::Infrastructure => "infrastructure",
            EvaluationKind::It => "it",
            EvaluationKind::Trades => "trades",
            EvaluationKind::Headteacher => "headteacher",
        }
    }
}

impl fmt::Display for EvaluationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for EvaluationKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        EvaluationKind::ALL
            .into_iter()
            .find(|k| k.as_str() == needle)
            .ok_or_else(|| {
                let expected: Vec<_> = EvaluationKind::ALL.iter().map(|k| k.as_str()).collect();
                anyhow::anyhow!(
                    "Unknown evaluation kind '{}'. Expected one of: {}",
                    s,
                    expected.join(", ")
                )
            })
    }
}

/// Scoring table for one kind of inspection.
///
/// Example YAML:
/// ```yaml
/// kind: it
/// title: ICT Facilities
/// sections:
///   - id: hardware
///     title: Hardware
///     max_marks: 1.5
///     items:
///       - { id: computers, label: "Computers per trainee", marks: 1 }
///       - { id: ups, label: "UPS units", marks: 0.5, mode: availability-only }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Rubric {
    pub kind: EvaluationKind,
    pub title: String,
    pub sections: Vec<SectionRubric>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SectionRubric {
    pub id: String,
    pub title: String,
    /// Maximum shown against the section total. Set by the rubric authors, not
    /// derived from the item marks.
    pub max_marks: f64,
    pub items: Vec<ItemRubric>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ItemRubric {
    pub id: String,
    pub label: String,
    pub marks: f64,
    #[serde(default)]
    pub mode: ItemMode,
}

impl Rubric {
    pub fn section(&self, id: &str) -> Option<&SectionRubric> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Sum of the section maxima.
    pub fn max_marks(&self) -> f64 {
        self.sections.iter().map(|s| s.max_marks).sum()
    }

    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }
}

impl SectionRubric {
    pub fn item(&self, id: &str) -> Option<&ItemRubric> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Sum of the marks allocated to the section's items.
    pub fn allocated(&self) -> f64 {
        self.items.iter().map(|i| i.marks).sum()
    }
}
