use serde::Serialize;

use crate::evaluation::Evaluation;
use crate::rubric::Rubric;

/// Section totals against their maxima, in rubric order. This is the whole
/// contract a chart needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub title: String,
    pub labels: Vec<String>,
    pub totals: Vec<f64>,
    pub maxima: Vec<f64>,
}

pub fn chart_series(evaluation: &Evaluation, rubric: &Rubric) -> ChartSeries {
    let mut series = ChartSeries {
        title: format!("{} - {}", rubric.title, evaluation.subject_id),
        labels: Vec::with_capacity(rubric.sections.len()),
        totals: Vec::with_capacity(rubric.sections.len()),
        maxima: Vec::with_capacity(rubric.sections.len()),
    };
    for section in &rubric.sections {
        series.labels.push(section.title.clone());
        series
            .totals
            .push(evaluation.section(&section.id).map(|s| s.total_marks).unwrap_or(0.0));
        series.maxima.push(section.max_marks);
    }
    series
}
