use anyhow::{Context, Result};
use log::{debug, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::types::{draft_key, is_draft_key, DraftRecord, DraftSummary, DRAFT_VERSION};
use crate::evaluation::Evaluation;

/// Get the platform-appropriate draft cache directory
pub fn get_drafts_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("inspect-score/drafts"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.cache/inspect-score/drafts",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

fn decode(key: &str, bytes: &[u8]) -> Result<DraftRecord> {
    let record: DraftRecord = serde_json::from_slice(bytes)
        .with_context(|| format!("Failed to load draft '{}'", key))?;

    if record.version != DRAFT_VERSION {
        anyhow::bail!(
            "Unsupported draft version {} for '{}' (expected {})",
            record.version,
            key,
            DRAFT_VERSION
        );
    }

    Ok(record)
}

/// Save a snapshot of `evaluation` under its user/subject key.
///
/// The previous snapshot's content is deleted once the new one is written, so
/// autosaving does not grow the cache.
pub fn save_draft(cache_path: &Path, evaluation: &Evaluation) -> Result<DraftRecord> {
    let key = draft_key(&evaluation.user_id, &evaluation.subject_id);
    let previous = cacache::metadata_sync(cache_path, &key)
        .with_context(|| format!("Failed to read draft index for '{}'", key))?;

    let record = DraftRecord::new(evaluation.clone());
    let json = serde_json::to_vec(&record).context("Failed to serialize draft")?;
    let integrity = cacache::write_sync(cache_path, &key, &json)
        .with_context(|| format!("Failed to save draft '{}'", key))?;

    if let Some(previous) = previous {
        if previous.integrity != integrity {
            if let Err(e) = cacache::remove_hash_sync(cache_path, &previous.integrity) {
                warn!("Could not reclaim old snapshot of {}: {}", key, e);
            }
        }
    }
    debug!("Saved draft {} ({} bytes)", key, json.len());
    Ok(record)
}

/// Load the draft for a user/subject pair.
///
/// Returns `Ok(None)` if no draft exists. A draft written with another schema
/// version, or one whose stored identity differs from the request, is an
/// error.
pub fn load_draft(
    cache_path: &Path,
    user_id: &str,
    subject_id: &str,
) -> Result<Option<DraftRecord>> {
    let key = draft_key(user_id, subject_id);
    let exists = cacache::metadata_sync(cache_path, &key)
        .with_context(|| format!("Failed to read draft index for '{}'", key))?
        .is_some();
    if !exists {
        return Ok(None);
    }

    let bytes = cacache::read_sync(cache_path, &key)
        .with_context(|| format!("Failed to read draft '{}'", key))?;
    let record = decode(&key, &bytes)?;

    let eval = &record.evaluation;
    if eval.user_id != user_id || eval.subject_id != subject_id {
        anyhow::bail!(
            "Draft '{}' belongs to user '{}', subject '{}'",
            key,
            eval.user_id,
            eval.subject_id
        );
    }
    Ok(Some(record))
}

/// Delete the index entry and content stored under `key`.
fn remove_key(cache_path: &Path, key: &str) -> Result<()> {
    cacache::RemoveOpts::new()
        .remove_fully(true)
        .remove_sync(cache_path, key)
        .with_context(|| format!("Failed to remove draft '{}'", key))
}

/// Remove a draft. Returns true if one was present.
pub fn remove_draft(cache_path: &Path, user_id: &str, subject_id: &str) -> Result<bool> {
    let key = draft_key(user_id, subject_id);
    let exists = cacache::metadata_sync(cache_path, &key)
        .with_context(|| format!("Failed to read draft index for '{}'", key))?
        .is_some();
    if exists {
        remove_key(cache_path, &key)?;
    }
    Ok(exists)
}

/// Load every readable draft in the cache, newest first.
///
/// Unreadable entries are skipped with a warning so one bad record does not
/// hide the others.
pub fn list_drafts(cache_path: &Path) -> Result<Vec<DraftRecord>> {
    if !cache_path.exists() {
        return Ok(Vec::new());
    }

    let mut seen = HashSet::new();
    let mut records = Vec::new();
    for entry in cacache::list_sync(cache_path) {
        let metadata = match entry {
            Ok(m) => m,
            Err(e) => {
                warn!("Skipping unreadable draft index entry: {}", e);
                continue;
            }
        };
        if !is_draft_key(&metadata.key) || !seen.insert(metadata.key.clone()) {
            continue;
        }
        let loaded = cacache::read_sync(cache_path, &metadata.key)
            .map_err(anyhow::Error::from)
            .and_then(|bytes| decode(&metadata.key, &bytes));
        match loaded {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping draft {}: {:#}", metadata.key, e),
        }
    }

    records.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
    Ok(records)
}

pub fn list_draft_summaries(cache_path: &Path) -> Result<Vec<DraftSummary>> {
    Ok(list_drafts(cache_path)?.iter().map(DraftSummary::from).collect())
}

/// Remove drafts last saved more than `older_than` ago. Returns how many
/// were removed.
///
/// Ages come from the cache index, so records that no longer decode are
/// pruned too.
pub fn prune_drafts(cache_path: &Path, older_than: Duration) -> Result<usize> {
    if !cache_path.exists() {
        return Ok(0);
    }

    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("System clock is before 1970")?
        .as_millis();
    let cutoff = now_ms.saturating_sub(older_than.as_millis());

    let mut stale = Vec::new();
    for entry in cacache::list_sync(cache_path) {
        match entry {
            Ok(metadata) if is_draft_key(&metadata.key) && metadata.time <= cutoff => {
                stale.push(metadata.key)
            }
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable draft index entry: {}", e),
        }
    }
    stale.sort();
    stale.dedup();

    for key in &stale {
        remove_key(cache_path, key)?;
        debug!("Pruned {}", key);
    }
    Ok(stale.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::FieldPatch;
    use crate::rubric::{builtin_rubric, EvaluationKind};
    use crate::scoring::{BinaryMark, Weights};
    use std::env;

    fn temp_cache(name: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("inspect_score_test_drafts_{}", name));
        let _ = std::fs::remove_dir_all(&path);
        path
    }

    /// Files under `cache` matching `sub` and their total size in bytes.
    fn disk_usage(cache: &Path, sub: &str) -> (usize, u64) {
        let pattern = format!("{}/{}", cache.display(), sub);
        glob::glob(&pattern)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .fold((0, 0), |(count, bytes), path| {
                (count + 1, bytes + std::fs::metadata(&path).unwrap().len())
            })
    }

    #[test]
    fn test_load_missing_draft_returns_none() {
        let cache = temp_cache("missing");
        std::fs::create_dir_all(&cache).unwrap();
        assert!(load_draft(&cache, "u", "nobody").unwrap().is_none());
        let _ = std::fs::remove_dir_all(&cache);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let cache = temp_cache("roundtrip");
        let rubric = builtin_rubric(EvaluationKind::Trades);
        let mut eval = Evaluation::new(&rubric, "inspector", "school-5");
        eval.update_field(
            "equipment",
            "tools",
            &FieldPatch {
                availability: Some(BinaryMark::YES),
                quality: Some(BinaryMark::NO),
                observation: Some("Rusty".to_string()),
            },
            &rubric,
            Weights::default(),
        )
        .unwrap();

        save_draft(&cache, &eval).unwrap();
        let loaded = load_draft(&cache, "inspector", "school-5").unwrap().unwrap();

        assert_eq!(loaded.version, DRAFT_VERSION);
        assert_eq!(loaded.evaluation, eval);
        let _ = std::fs::remove_dir_all(&cache);
    }

    #[test]
    fn test_save_overwrites_previous_snapshot() {
        let cache = temp_cache("overwrite");
        let rubric = builtin_rubric(EvaluationKind::It);
        let mut eval = Evaluation::new(&rubric, "u", "s");
        save_draft(&cache, &eval).unwrap();

        eval.overview.strengths = "Good lab".to_string();
        save_draft(&cache, &eval).unwrap();

        let loaded = load_draft(&cache, "u", "s").unwrap().unwrap();
        assert_eq!(loaded.evaluation.overview.strengths, "Good lab");
        assert_eq!(list_drafts(&cache).unwrap().len(), 1);
        let _ = std::fs::remove_dir_all(&cache);
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let cache = temp_cache("version");
        let rubric = builtin_rubric(EvaluationKind::It);
        let mut record = DraftRecord::new(Evaluation::new(&rubric, "u", "s"));
        record.version = 99;
        let json = serde_json::to_vec(&record).unwrap();
        cacache::write_sync(&cache, &draft_key("u", "s"), &json).unwrap();

        let err = load_draft(&cache, "u", "s").unwrap_err();
        assert!(err.to_string().contains("Unsupported draft version"), "got: {}", err);
        let _ = std::fs::remove_dir_all(&cache);
    }

    #[test]
    fn test_remove_and_list() {
        let cache = temp_cache("remove");
        let rubric = builtin_rubric(EvaluationKind::Headteacher);
        save_draft(&cache, &Evaluation::new(&rubric, "u", "a")).unwrap();
        save_draft(&cache, &Evaluation::new(&rubric, "u", "b")).unwrap();

        assert_eq!(list_draft_summaries(&cache).unwrap().len(), 2);
        assert!(remove_draft(&cache, "u", "a").unwrap());
        assert!(!remove_draft(&cache, "u", "a").unwrap());

        let remaining = list_draft_summaries(&cache).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].subject_id, "b");
        assert_eq!(remaining[0].kind, EvaluationKind::Headteacher);
        let _ = std::fs::remove_dir_all(&cache);
    }

    #[test]
    fn test_prune_keeps_recent_drafts() {
        let cache = temp_cache("prune");
        let rubric = builtin_rubric(EvaluationKind::It);
        save_draft(&cache, &Evaluation::new(&rubric, "u", "fresh")).unwrap();

        let removed = prune_drafts(&cache, Duration::from_secs(3600)).unwrap();
        assert_eq!(removed, 0);

        let removed = prune_drafts(&cache, Duration::from_secs(0)).unwrap();
        assert_eq!(removed, 1);
        assert!(list_drafts(&cache).unwrap().is_empty());
        let _ = std::fs::remove_dir_all(&cache);
    }

    #[test]
    fn test_load_rejects_record_under_foreign_key() {
        let cache = temp_cache("foreign");
        let rubric = builtin_rubric(EvaluationKind::It);
        let record = DraftRecord::new(Evaluation::new(&rubric, "u", "a:b"));
        let json = serde_json::to_vec(&record).unwrap();
        cacache::write_sync(&cache, &draft_key("u:a", "b"), &json).unwrap();

        let err = load_draft(&cache, "u:a", "b").unwrap_err();
        assert!(err.to_string().contains("belongs to user 'u'"), "got: {}", err);
        let _ = std::fs::remove_dir_all(&cache);
    }

    #[test]
    fn test_autosave_and_prune_reclaim_disk() {
        let cache = temp_cache("reclaim");
        let rubric = builtin_rubric(EvaluationKind::It);
        let mut eval = Evaluation::new(&rubric, "u", "s");
        for i in 0..50 {
            eval.overview.strengths = format!("revision {}", i);
            save_draft(&cache, &eval).unwrap();
        }

        let (content_files, _) = disk_usage(&cache, "content-v2/**/*");
        assert_eq!(content_files, 1);
        let (_, before) = disk_usage(&cache, "**/*");

        assert_eq!(prune_drafts(&cache, Duration::from_secs(0)).unwrap(), 1);
        let (content_files, _) = disk_usage(&cache, "content-v2/**/*");
        let (_, after) = disk_usage(&cache, "**/*");
        assert_eq!(content_files, 0);
        assert!(after < before, "cache grew from {} to {} bytes", before, after);
        let _ = std::fs::remove_dir_all(&cache);
    }

    #[test]
    fn test_remove_reclaims_content() {
        let cache = temp_cache("remove_fully");
        let rubric = builtin_rubric(EvaluationKind::Trades);
        save_draft(&cache, &Evaluation::new(&rubric, "u", "gone")).unwrap();
        assert!(remove_draft(&cache, "u", "gone").unwrap());
        assert_eq!(disk_usage(&cache, "content-v2/**/*").0, 0);
        assert!(load_draft(&cache, "u", "gone").unwrap().is_none());
        let _ = std::fs::remove_dir_all(&cache);
    }

    #[test]
    fn test_prune_removes_undecodable_records() {
        let cache = temp_cache("prune_stale_version");
        let rubric = builtin_rubric(EvaluationKind::It);
        let mut record = DraftRecord::new(Evaluation::new(&rubric, "u", "old"));
        record.version = 99;
        let json = serde_json::to_vec(&record).unwrap();
        cacache::write_sync(&cache, &draft_key("u", "old"), &json).unwrap();
        assert!(list_drafts(&cache).unwrap().is_empty());

        assert_eq!(prune_drafts(&cache, Duration::from_secs(3600)).unwrap(), 0);
        assert_eq!(prune_drafts(&cache, Duration::from_secs(0)).unwrap(), 1);
        assert!(cacache::metadata_sync(&cache, draft_key("u", "old")).unwrap().is_none());
        let _ = std::fs::remove_dir_all(&cache);
    }

    #[test]
    fn test_list_missing_cache_is_empty() {
        let cache = temp_cache("absent");
        assert!(list_drafts(&cache).unwrap().is_empty());
    }
}
