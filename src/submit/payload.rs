use serde::{Deserialize, Serialize};

use crate::evaluation::Evaluation;
use crate::rubric::EvaluationKind;

/// Body POSTed to the submission endpoint.
#[derive(Debug, Serialize)]
pub struct SubmissionPayload<'a> {
    #[serde(rename = "type")]
    pub kind: EvaluationKind,
    pub total: f64,
    pub evaluation: &'a Evaluation,
}

impl<'a> SubmissionPayload<'a> {
    pub fn new(evaluation: &'a Evaluation) -> Self {
        Self {
            kind: evaluation.kind,
            total: evaluation.total_marks,
            evaluation,
        }
    }
}

/// What the server acknowledged. Servers that reply without a body still
/// produce a receipt.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubmissionReceipt {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

impl SubmissionReceipt {
    /// Parse a response body, tolerating empty or non-JSON bodies.
    pub fn from_body(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or(SubmissionReceipt { id: None })
    }

    pub fn id_string(&self) -> Option<String> {
        match &self.id {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::FieldPatch;
    use crate::rubric::builtin_rubric;
    use crate::scoring::{BinaryMark, Weights};

    #[test]
    fn test_payload_shape() {
        let rubric = builtin_rubric(EvaluationKind::Infrastructure);
        let mut eval = Evaluation::new(&rubric, "inspector", "school-11");
        eval.update_field(
            "classrooms",
            "power",
            &FieldPatch {
                availability: Some(BinaryMark::YES),
                ..Default::default()
            },
            &rubric,
            Weights::default(),
        )
        .unwrap();

        let value = serde_json::to_value(SubmissionPayload::new(&eval)).unwrap();
        assert_eq!(value["type"], "infrastructure");
        assert_eq!(value["total"], 0.5);
        assert_eq!(value["evaluation"]["subjectId"], "school-11");
        assert_eq!(value["evaluation"]["totalMarks"], 0.5);
    }

    #[test]
    fn test_receipt_parsing() {
        let receipt = SubmissionReceipt::from_body(r#"{"id": "abc"}"#);
        assert_eq!(receipt.id_string(), Some("abc".to_string()));
        let receipt = SubmissionReceipt::from_body(r#"{"id": 17, "ok": true}"#);
        assert_eq!(receipt.id_string(), Some("17".to_string()));
        assert_eq!(SubmissionReceipt::from_body("").id_string(), None);
        assert_eq!(SubmissionReceipt::from_body("created").id_string(), None);
    }
}
