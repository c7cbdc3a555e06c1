use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::evaluation::Evaluation;
use crate::rubric::EvaluationKind;

/// Schema version written with every draft record
pub const DRAFT_VERSION: u32 = 1;

const KEY_PREFIX: &str = "draft:";

/// Cache key for the draft of `subject_id` held by `user_id`
pub fn draft_key(user_id: &str, subject_id: &str) -> String {
    format!("{}{}:{}", KEY_PREFIX, user_id, subject_id)
}

/// Check that `value` can be used as one part of a draft key.
///
/// `:` separates the parts, so it may appear in neither.
pub fn check_key_part(what: &str, value: &str) -> anyhow::Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{} must not be empty", what);
    }
    if value.contains(':') {
        anyhow::bail!("{} must not contain ':' (got '{}')", what, value);
    }
    Ok(())
}

pub fn is_draft_key(key: &str) -> bool {
    key.starts_with(KEY_PREFIX)
}

/// Locally cached evaluation snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftRecord {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub evaluation: Evaluation,
}

impl DraftRecord {
    pub fn new(evaluation: Evaluation) -> Self {
        Self {
            version: DRAFT_VERSION,
            saved_at: Utc::now(),
            evaluation,
        }
    }
}

/// One line of `drafts list`.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftSummary {
    pub user_id: String,
    pub subject_id: String,
    pub kind: EvaluationKind,
    pub submitted: bool,
    pub total_marks: f64,
    /// Items with any answer recorded
    pub answered: usize,
    pub saved_at: DateTime<Utc>,
}

impl From<&DraftRecord> for DraftSummary {
    fn from(record: &DraftRecord) -> Self {
        let eval = &record.evaluation;
        Self {
            user_id: eval.user_id.clone(),
            subject_id: eval.subject_id.clone(),
            kind: eval.kind,
            submitted: eval.is_submitted(),
            total_marks: eval.total_marks,
            answered: eval.answered_items(),
            saved_at: record.saved_at,
        }
    }
}

impl DraftSummary {
    /// Format how long ago the draft was saved, e.g. "3h ago"
    pub fn format_age(&self) -> String {
        let elapsed = Utc::now() - self.saved_at;
        let minutes = elapsed.num_minutes();
        let hours = elapsed.num_hours();
        let days = elapsed.num_days();
        if days >= 1 {
            format!("{}d ago", days)
        } else if hours >= 1 {
            format!("{}h ago", hours)
        } else if minutes >= 1 {
            format!("{}m ago", minutes)
        } else {
            "just now".to_string()
        }
    }
}
