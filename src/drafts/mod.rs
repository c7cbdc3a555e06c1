pub mod storage;
pub mod types;

pub use storage::{
    get_drafts_path, list_draft_summaries, list_drafts, load_draft, prune_drafts, remove_draft,
    save_draft,
};
pub use types::{check_key_part, draft_key, DraftRecord, DraftSummary, DRAFT_VERSION};
