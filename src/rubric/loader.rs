use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::Path;

use super::builtin::builtin_rubric;
use super::types::{EvaluationKind, Rubric};
use super::validation::validate_rubric;

/// Load a rubric from a YAML file and validate it.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The YAML is malformed
/// - The rubric fails validation (all problems are listed)
pub fn load_rubric(path: &Path) -> Result<Rubric> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rubric file at {}", path.display()))?;
    let rubric: Rubric = serde_saphyr::from_str(&content)
        .with_context(|| format!("Failed to parse rubric: invalid YAML in {}", path.display()))?;

    if let Err(errors) = validate_rubric(&rubric) {
        anyhow::bail!(
            "Rubric {} is invalid:\n  - {}",
            path.display(),
            errors.join("\n  - ")
        );
    }

    Ok(rubric)
}

/// Load every `*.yaml` rubric in a directory, sorted by file name.
pub fn load_rubric_dir(dir: &Path) -> Result<Vec<Rubric>> {
    let pattern = dir.join("*.yaml");
    let pattern = pattern
        .to_str()
        .with_context(|| format!("Rubric directory is not valid UTF-8: {}", dir.display()))?;

    let mut paths: Vec<_> = glob::glob(pattern)
        .context("Invalid rubric directory pattern")?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Skipping unreadable rubric entry: {}", e);
                None
            }
        })
        .collect();
    paths.sort();

    paths
        .iter()
        .map(|path| {
            debug!("Loading rubric override {}", path.display());
            load_rubric(path)
        })
        .collect()
}

/// Pick the rubric for `kind`: an override from `dir` if one exists,
/// otherwise the built-in table.
pub fn resolve_rubric(kind: EvaluationKind, dir: Option<&Path>) -> Result<Rubric> {
    if let Some(dir) = dir {
        let mut overrides: Vec<_> = load_rubric_dir(dir)?
            .into_iter()
            .filter(|r| r.kind == kind)
            .collect();
        if overrides.len() > 1 {
            anyhow::bail!(
                "{} rubric files for '{}' found in {}; keep only one",
                overrides.len(),
                kind,
                dir.display()
            );
        }
        if let Some(rubric) = overrides.pop() {
            debug!("Using rubric override for {}", kind);
            return Ok(rubric);
        }
    }
    Ok(builtin_rubric(kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = env::temp_dir().join(format!("inspect_score_test_{}", name));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    const IT_OVERRIDE: &str = r#"
kind: it
title: Short ICT
sections:
  - id: hardware
    title: Hardware
    max_marks: 1
    items:
      - { id: computers, label: Computers, marks: 1 }
"#;

    #[test]
    fn test_resolve_without_dir_uses_builtin() {
        let rubric = resolve_rubric(EvaluationKind::Trades, None).unwrap();
        assert_eq!(rubric, builtin_rubric(EvaluationKind::Trades));
    }

    #[test]
    fn test_resolve_prefers_override() {
        let dir = temp_dir("rubric_override");
        fs::write(dir.join("it.yaml"), IT_OVERRIDE).unwrap();

        let it = resolve_rubric(EvaluationKind::It, Some(&dir)).unwrap();
        assert_eq!(it.title, "Short ICT");
        assert_eq!(it.item_count(), 1);

        // Kinds without an override fall back to the built-in table
        let trades = resolve_rubric(EvaluationKind::Trades, Some(&dir)).unwrap();
        assert_eq!(trades.title, "Trade Areas");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_duplicate_override_rejected() {
        let dir = temp_dir("rubric_duplicate");
        fs::write(dir.join("a.yaml"), IT_OVERRIDE).unwrap();
        fs::write(dir.join("b.yaml"), IT_OVERRIDE).unwrap();

        let result = resolve_rubric(EvaluationKind::It, Some(&dir));
        assert!(result.is_err());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_invalid_rubric_file_lists_errors() {
        let dir = temp_dir("rubric_invalid");
        let path = dir.join("bad.yaml");
        fs::write(
            &path,
            r#"
kind: trades
title: Bad
sections:
  - id: tools
    title: Tools
    max_marks: 1
    items:
      - { id: hammer, label: Hammer, marks: 2 }
"#,
        )
        .unwrap();

        let err = load_rubric(&path).unwrap_err();
        assert!(err.to_string().contains("exceed max_marks"), "got: {}", err);

        let _ = fs::remove_dir_all(&dir);
    }
}
