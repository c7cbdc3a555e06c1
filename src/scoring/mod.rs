pub mod engine;
pub mod mark;
pub mod mode;
pub mod weights;

pub use engine::{
    grand_total, score, score_item, score_raw, section_total, EvaluationScore, ItemScore,
    SectionScore,
};
pub use mark::{BinaryMark, ScoreError};
pub use mode::ItemMode;
pub use weights::Weights;
