pub mod builtin;
pub mod loader;
pub mod types;
pub mod validation;

pub use builtin::builtin_rubric;
pub use loader::{load_rubric, load_rubric_dir, resolve_rubric};
pub use types::{EvaluationKind, ItemRubric, Rubric, SectionRubric};
pub use validation::validate_rubric;
