use chrono::{DateTime, Utc};

use super::types::{Evaluation, EvaluationError, FieldPatch, OverviewPatch, Section, Status};
use crate::rubric::Rubric;
use crate::scoring::{grand_total, ScoreError, Weights};

/// Return a copy of `section` with `patch` applied to item `key`.
///
/// The returned section's `total_marks` is stale until [`recompute`] runs.
pub fn with_field(section: &Section, key: &str, patch: &FieldPatch) -> Result<Section, ScoreError> {
    let mut next = section.clone();
    let field = next.fields.get_mut(key).ok_or_else(|| ScoreError::UnknownItem {
        section: section.id.clone(),
        item: key.to_string(),
    })?;

    if let Some(availability) = patch.availability {
        field.availability = availability;
    }
    if let Some(quality) = patch.quality {
        field.quality = quality;
    }
    if let Some(ref observation) = patch.observation {
        field.observation = observation.clone();
    }

    Ok(next)
}

/// Rebuild every section total and the grand total from the fields.
///
/// Totals already stored on the evaluation are ignored.
pub fn recompute(
    mut evaluation: Evaluation,
    rubric: &Rubric,
    weights: Weights,
) -> Result<Evaluation, ScoreError> {
    let score = grand_total(&evaluation, rubric, weights)?;
    for section in &mut evaluation.sections {
        section.total_marks = score
            .sections
            .iter()
            .find(|s| s.section == section.id)
            .map(|s| s.total)
            .unwrap_or(0.0);
    }
    evaluation.total_marks = score.total;
    Ok(evaluation)
}

impl Evaluation {
    fn ensure_draft(&self) -> Result<(), EvaluationError> {
        if self.is_submitted() {
            Err(EvaluationError::AlreadySubmitted)
        } else {
            Ok(())
        }
    }

    /// Apply one answer and recompute all totals.
    ///
    /// On error the evaluation is left unchanged.
    pub fn update_field(
        &mut self,
        section_id: &str,
        key: &str,
        patch: &FieldPatch,
        rubric: &Rubric,
        weights: Weights,
    ) -> Result<(), EvaluationError> {
        self.ensure_draft()?;
        let index = self
            .sections
            .iter()
            .position(|s| s.id == section_id)
            .ok_or_else(|| EvaluationError::UnknownSection(section_id.to_string()))?;

        let mut next = self.clone();
        next.sections[index] = with_field(&self.sections[index], key, patch)?;
        let mut next = recompute(next, rubric, weights)?;
        next.updated_at = Utc::now();
        *self = next;
        Ok(())
    }

    pub fn update_overview(&mut self, patch: &OverviewPatch) -> Result<(), EvaluationError> {
        self.ensure_draft()?;
        if let Some(ref strengths) = patch.strengths {
            self.overview.strengths = strengths.clone();
        }
        if let Some(ref weaknesses) = patch.weaknesses {
            self.overview.weaknesses = weaknesses.clone();
        }
        if let Some(ref improvement) = patch.improvement {
            self.overview.improvement = improvement.clone();
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Terminal transition. A submitted evaluation rejects every later change.
    pub fn mark_submitted(&mut self, at: DateTime<Utc>) -> Result<(), EvaluationError> {
        self.ensure_draft()?;
        self.status = Status::Submitted { submitted_at: at };
        self.updated_at = at;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::{builtin_rubric, EvaluationKind};
    use crate::scoring::BinaryMark;

    fn yes_yes() -> FieldPatch {
        FieldPatch {
            availability: Some(BinaryMark::YES),
            quality: Some(BinaryMark::YES),
            observation: None,
        }
    }

    fn fresh(kind: EvaluationKind) -> (Evaluation, Rubric) {
        let rubric = builtin_rubric(kind);
        (Evaluation::new(&rubric, "inspector", "school-1"), rubric)
    }

    #[test]
    fn test_with_field_is_pure() {
        let (eval, _) = fresh(EvaluationKind::It);
        let original = eval.sections[0].clone();
        let patched = with_field(&original, "computers", &yes_yes()).unwrap();

        assert_eq!(original, eval.sections[0]);
        assert_eq!(patched.fields["computers"].availability, BinaryMark::YES);
        assert_eq!(original.fields["computers"].availability, BinaryMark::NO);
    }

    #[test]
    fn test_with_field_keeps_untouched_values() {
        let (eval, _) = fresh(EvaluationKind::It);
        let first = with_field(
            &eval.sections[0],
            "computers",
            &FieldPatch {
                observation: Some("30 working desktops".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        let second = with_field(
            &first,
            "computers",
            &FieldPatch {
                quality: Some(BinaryMark::YES),
                ..Default::default()
            },
        )
        .unwrap();
        let field = &second.fields["computers"];
        assert_eq!(field.observation, "30 working desktops");
        assert_eq!(field.quality, BinaryMark::YES);
        assert_eq!(field.availability, BinaryMark::NO);
    }

    #[test]
    fn test_with_field_unknown_key() {
        let (eval, _) = fresh(EvaluationKind::It);
        let result = with_field(&eval.sections[0], "photocopier", &yes_yes());
        assert!(matches!(result, Err(ScoreError::UnknownItem { .. })));
    }

    #[test]
    fn test_update_field_recomputes_totals() {
        let (mut eval, rubric) = fresh(EvaluationKind::It);
        let w = Weights::default();

        eval.update_field("hardware", "computers", &yes_yes(), &rubric, w).unwrap();
        assert_eq!(eval.section("hardware").unwrap().total_marks, 2.0);
        assert_eq!(eval.total_marks, 2.0);

        // ups is availability-only: quality is ignored
        eval.update_field(
            "hardware",
            "ups",
            &FieldPatch {
                quality: Some(BinaryMark::YES),
                ..Default::default()
            },
            &rubric,
            w,
        )
        .unwrap();
        assert_eq!(eval.total_marks, 2.0);

        eval.update_field("connectivity", "lan", &yes_yes(), &rubric, w).unwrap();
        assert_eq!(eval.section("connectivity").unwrap().total_marks, 1.0);
        assert_eq!(eval.total_marks, 3.0);

        // Reverting an answer brings the total back down
        eval.update_field(
            "hardware",
            "computers",
            &FieldPatch {
                availability: Some(BinaryMark::NO),
                quality: Some(BinaryMark::NO),
                observation: None,
            },
            &rubric,
            w,
        )
        .unwrap();
        assert_eq!(eval.total_marks, 1.0);
    }

    #[test]
    fn test_recompute_ignores_stale_totals() {
        let (mut eval, rubric) = fresh(EvaluationKind::Trades);
        eval.update_field("equipment", "tools", &yes_yes(), &rubric, Weights::default())
            .unwrap();

        let mut tampered = eval.clone();
        tampered.total_marks = 999.0;
        tampered.sections[0].total_marks = 42.0;

        let fixed = recompute(tampered, &rubric, Weights::default()).unwrap();
        assert_eq!(fixed, eval);

        let again = recompute(fixed.clone(), &rubric, Weights::default()).unwrap();
        assert_eq!(again, fixed);
    }

    #[test]
    fn test_failed_update_leaves_evaluation_unchanged() {
        let (mut eval, rubric) = fresh(EvaluationKind::It);
        let before = eval.clone();
        assert!(matches!(
            eval.update_field("nope", "computers", &yes_yes(), &rubric, Weights::default()),
            Err(EvaluationError::UnknownSection(_))
        ));
        assert!(eval
            .update_field("hardware", "nope", &yes_yes(), &rubric, Weights::default())
            .is_err());
        assert_eq!(eval, before);
    }

    #[test]
    fn test_submitted_evaluation_is_immutable() {
        let (mut eval, rubric) = fresh(EvaluationKind::Headteacher);
        eval.mark_submitted(Utc::now()).unwrap();

        assert_eq!(
            eval.update_field("finance", "budget", &yes_yes(), &rubric, Weights::default()),
            Err(EvaluationError::AlreadySubmitted)
        );
        assert_eq!(
            eval.update_overview(&OverviewPatch::default()),
            Err(EvaluationError::AlreadySubmitted)
        );
        assert_eq!(
            eval.mark_submitted(Utc::now()),
            Err(EvaluationError::AlreadySubmitted)
        );
    }

    #[test]
    fn test_update_overview() {
        let (mut eval, _) = fresh(EvaluationKind::Headteacher);
        eval.update_overview(&OverviewPatch {
            strengths: Some("Strong board".to_string()),
            ..Default::default()
        })
        .unwrap();
        eval.update_overview(&OverviewPatch {
            weaknesses: Some("No audit".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(eval.overview.strengths, "Strong board");
        assert_eq!(eval.overview.weaknesses, "No audit");
        assert!(eval.overview.improvement.is_empty());
    }
}
