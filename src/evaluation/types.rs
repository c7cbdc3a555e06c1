use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::rubric::{EvaluationKind, Rubric};
use crate::scoring::{BinaryMark, ScoreError};

/// Answers for one inspected item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationField {
    #[serde(default)]
    pub availability: BinaryMark,
    #[serde(default)]
    pub quality: BinaryMark,
    #[serde(default)]
    pub observation: String,
}

/// Partial update for an [`EvaluationField`]. `None` leaves a value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPatch {
    pub availability: Option<BinaryMark>,
    pub quality: Option<BinaryMark>,
    pub observation: Option<String>,
}

impl FieldPatch {
    pub fn is_empty(&self) -> bool {
        self.availability.is_none() && self.quality.is_none() && self.observation.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub fields: BTreeMap<String, EvaluationField>,
    /// Derived from `fields`; rebuilt by `recompute`.
    #[serde(default)]
    pub total_marks: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overview {
    #[serde(default)]
    pub strengths: String,
    #[serde(default)]
    pub weaknesses: String,
    #[serde(default)]
    pub improvement: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverviewPatch {
    pub strengths: Option<String>,
    pub weaknesses: Option<String>,
    pub improvement: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum Status {
    Draft,
    Submitted {
        #[serde(rename = "submittedAt")]
        submitted_at: DateTime<Utc>,
    },
}

/// One inspection of one subject (an institution, a trade area or a
/// headteacher) by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub kind: EvaluationKind,
    pub user_id: String,
    pub subject_id: String,
    pub sections: Vec<Section>,
    #[serde(default)]
    pub overview: Overview,
    /// Sum of the section totals; rebuilt by `recompute`.
    #[serde(default)]
    pub total_marks: f64,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Evaluation {
    /// Start an evaluation with every rubric item present and zeroed.
    pub fn new(rubric: &Rubric, user_id: &str, subject_id: &str) -> Self {
        let now = Utc::now();
        let sections = rubric
            .sections
            .iter()
            .map(|s| Section {
                id: s.id.clone(),
                fields: s
                    .items
                    .iter()
                    .map(|i| (i.id.clone(), EvaluationField::default()))
                    .collect(),
                total_marks: 0.0,
            })
            .collect();

        Self {
            kind: rubric.kind,
            user_id: user_id.to_string(),
            subject_id: subject_id.to_string(),
            sections,
            overview: Overview::default(),
            total_marks: 0.0,
            status: Status::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self.status, Status::Submitted { .. })
    }

    /// Number of items with at least one "yes" or an observation.
    pub fn answered_items(&self) -> usize {
        self.sections
            .iter()
            .flat_map(|s| s.fields.values())
            .filter(|f| f.availability.is_yes() || f.quality.is_yes() || !f.observation.is_empty())
            .count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// Submitted evaluations are immutable.
    AlreadySubmitted,
    UnknownSection(String),
    Score(ScoreError),
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationError::AlreadySubmitted => {
                write!(f, "Evaluation has already been submitted and can no longer change")
            }
            EvaluationError::UnknownSection(id) => write!(f, "Unknown section '{}'", id),
            EvaluationError::Score(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for EvaluationError {}

impl From<ScoreError> for EvaluationError {
    fn from(e: ScoreError) -> Self {
        EvaluationError::Score(e)
    }
}
