pub mod steps;
pub mod types;
pub mod update;

pub use steps::{Step, Steps};
pub use types::{
    Evaluation, EvaluationError, EvaluationField, FieldPatch, Overview, OverviewPatch, Section,
    Status,
};
pub use update::{recompute, with_field};
