pub mod chart;
pub mod summary;

pub use chart::{chart_series, ChartSeries};
pub use summary::{summarize, SectionSummary, Summary};
