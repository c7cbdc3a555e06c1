use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::PathBuf;

use crate::config::{resolve_user_id, Config};
use crate::drafts::{check_key_part, list_drafts, load_draft, remove_draft, save_draft};
use crate::evaluation::{recompute, Evaluation};
use crate::rubric::{resolve_rubric, EvaluationKind, Rubric};
use crate::scoring::Weights;

/// Everything a command needs to read and write evaluations.
#[derive(Debug, Clone)]
pub struct Session {
    pub config: Config,
    pub weights: Weights,
    pub drafts_path: PathBuf,
}

impl Session {
    pub fn new(config: Config, drafts_path: PathBuf) -> Self {
        let weights = config.effective_weights();
        Self {
            config,
            weights,
            drafts_path,
        }
    }

    /// The acting user. Only commands that touch one user's drafts need it.
    pub fn user_id(&self) -> Result<String> {
        resolve_user_id(&self.config)
    }

    pub fn rubric(&self, kind: EvaluationKind) -> Result<Rubric> {
        resolve_rubric(kind, self.config.rubric_dir.as_deref())
    }

    /// Start a zeroed evaluation and save it as a draft.
    ///
    /// An existing draft or submitted record for the same subject is only
    /// replaced when `force` is set.
    pub fn start(
        &self,
        kind: EvaluationKind,
        subject_id: &str,
        force: bool,
    ) -> Result<(Evaluation, Rubric)> {
        check_key_part("Subject id", subject_id)?;
        let user_id = self.user_id()?;
        if let Some(existing) = load_draft(&self.drafts_path, &user_id, subject_id)? {
            if !force {
                let state = if existing.evaluation.is_submitted() {
                    "A submitted evaluation"
                } else {
                    "A draft"
                };
                anyhow::bail!(
                    "{} for '{}' already exists ({}). Use --force to start over.",
                    state,
                    subject_id,
                    existing.evaluation.kind
                );
            }
            debug!("Replacing existing record for {}", subject_id);
        }

        let rubric = self.rubric(kind)?;
        let evaluation = Evaluation::new(&rubric, &user_id, subject_id);
        self.persist(&evaluation)?;
        Ok((evaluation, rubric))
    }

    /// Load the draft for `subject_id` with its rubric. Totals are rebuilt from
    /// the stored answers.
    pub fn open(&self, subject_id: &str) -> Result<(Evaluation, Rubric)> {
        check_key_part("Subject id", subject_id)?;
        let user_id = self.user_id()?;
        let record = load_draft(&self.drafts_path, &user_id, subject_id)?.with_context(|| {
            format!(
                "No evaluation for '{}'. Start one with `inspect-score new <kind> {}`",
                subject_id, subject_id
            )
        })?;

        let rubric = self.rubric(record.evaluation.kind)?;
        let evaluation = recompute(record.evaluation, &rubric, self.weights).with_context(|| {
            format!(
                "Stored evaluation for '{}' does not match the current {} rubric",
                subject_id, rubric.kind
            )
        })?;
        Ok((evaluation, rubric))
    }

    /// Write the current state of `evaluation` to the local draft cache.
    pub fn persist(&self, evaluation: &Evaluation) -> Result<()> {
        save_draft(&self.drafts_path, evaluation)?;
        Ok(())
    }

    pub fn discard(&self, subject_id: &str) -> Result<bool> {
        check_key_part("Subject id", subject_id)?;
        remove_draft(&self.drafts_path, &self.user_id()?, subject_id)
    }

    /// Every cached evaluation of `kind`, from all users on this machine,
    /// with recomputed totals. Records that no longer fit the rubric are
    /// skipped with a warning.
    pub fn evaluations_of(&self, kind: EvaluationKind) -> Result<(Vec<Evaluation>, Rubric)> {
        let rubric = self.rubric(kind)?;
        let mut evaluations = Vec::new();
        for record in list_drafts(&self.drafts_path)? {
            if record.evaluation.kind != kind {
                continue;
            }
            let subject = record.evaluation.subject_id.clone();
            match recompute(record.evaluation, &rubric, self.weights) {
                Ok(eval) => evaluations.push(eval),
                Err(e) => warn!("Skipping evaluation for {}: {}", subject, e),
            }
        }
        Ok((evaluations, rubric))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::FieldPatch;
    use crate::scoring::BinaryMark;
    use chrono::Utc;
    use std::env;

    fn session(name: &str) -> Session {
        let path = env::temp_dir().join(format!("inspect_score_test_session_{}", name));
        let _ = std::fs::remove_dir_all(&path);
        let config = Config {
            user_id: Some("inspector".to_string()),
            ..Default::default()
        };
        Session::new(config, path)
    }

    fn cleanup(session: &Session) {
        let _ = std::fs::remove_dir_all(&session.drafts_path);
    }

    #[test]
    fn test_start_then_open() {
        let s = session("start_open");
        let (eval, _) = s.start(EvaluationKind::Trades, "school-1", false).unwrap();
        let (opened, rubric) = s.open("school-1").unwrap();
        assert_eq!(opened, eval);
        assert_eq!(rubric.kind, EvaluationKind::Trades);
        cleanup(&s);
    }

    #[test]
    fn test_start_refuses_to_overwrite() {
        let s = session("overwrite");
        s.start(EvaluationKind::It, "school-2", false).unwrap();
        assert!(s.start(EvaluationKind::It, "school-2", false).is_err());
        assert!(s.start(EvaluationKind::Trades, "school-2", true).is_ok());
        let (eval, _) = s.open("school-2").unwrap();
        assert_eq!(eval.kind, EvaluationKind::Trades);
        cleanup(&s);
    }

    #[test]
    fn test_subject_ids_cannot_forge_draft_keys() {
        let s = session("separator");
        assert!(s.start(EvaluationKind::It, "a:b", false).is_err());
        assert!(s.start(EvaluationKind::It, "   ", false).is_err());
        let err = s.open("a:b").unwrap_err();
        assert!(err.to_string().contains("must not contain ':'"));
        assert!(s.discard("a:b").is_err());
        cleanup(&s);
    }

    #[test]
    fn test_open_missing_subject() {
        let s = session("missing");
        let err = s.open("ghost").unwrap_err();
        assert!(err.to_string().contains("No evaluation for 'ghost'"));
    }

    #[test]
    fn test_open_recomputes_tampered_totals() {
        let s = session("tampered");
        let (mut eval, rubric) = s.start(EvaluationKind::It, "school-3", false).unwrap();
        eval.update_field(
            "connectivity",
            "lan",
            &FieldPatch {
                availability: Some(BinaryMark::YES),
                quality: Some(BinaryMark::YES),
                observation: None,
            },
            &rubric,
            s.weights,
        )
        .unwrap();
        eval.total_marks = 100.0;
        s.persist(&eval).unwrap();

        let (opened, _) = s.open("school-3").unwrap();
        assert_eq!(opened.total_marks, 1.0);
        cleanup(&s);
    }

    #[test]
    fn test_evaluations_of_kind() {
        let s = session("by_kind");
        s.start(EvaluationKind::It, "a", false).unwrap();
        s.start(EvaluationKind::It, "b", false).unwrap();
        s.start(EvaluationKind::Headteacher, "c", false).unwrap();

        let (evals, rubric) = s.evaluations_of(EvaluationKind::It).unwrap();
        assert_eq!(evals.len(), 2);
        assert_eq!(rubric.kind, EvaluationKind::It);
        cleanup(&s);
    }

    #[test]
    fn test_submitted_record_survives_reopen() {
        let s = session("submitted");
        let (mut eval, _) = s.start(EvaluationKind::It, "school-4", false).unwrap();
        eval.mark_submitted(Utc::now()).unwrap();
        s.persist(&eval).unwrap();

        let (opened, _) = s.open("school-4").unwrap();
        assert!(opened.is_submitted());
        assert!(s.start(EvaluationKind::It, "school-4", false).is_err());
        assert!(s.discard("school-4").unwrap());
        cleanup(&s);
    }
}
