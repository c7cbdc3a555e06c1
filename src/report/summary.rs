use serde::Serialize;

use crate::evaluation::Evaluation;
use crate::rubric::Rubric;

/// Aggregate of one section across many evaluations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionSummary {
    pub section: String,
    pub title: String,
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub max_marks: f64,
    /// Mean total as a percentage of `max_marks`
    pub mean_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub kind: String,
    pub evaluations: usize,
    pub mean_total: f64,
    pub max_marks: f64,
    pub sections: Vec<SectionSummary>,
}

fn percent(value: f64, of: f64) -> f64 {
    if of > 0.0 {
        value / of * 100.0
    } else {
        0.0
    }
}

/// Summarize the evaluations of `rubric.kind`; others are ignored.
pub fn summarize(evaluations: &[Evaluation], rubric: &Rubric) -> Summary {
    let matching: Vec<&Evaluation> = evaluations.iter().filter(|e| e.kind == rubric.kind).collect();

    let sections = rubric
        .sections
        .iter()
        .map(|section| {
            let totals: Vec<f64> = matching
                .iter()
                .filter_map(|e| e.section(&section.id))
                .map(|s| s.total_marks)
                .collect();
            let count = totals.len();
            let (mean, min, max) = if count == 0 {
                (0.0, 0.0, 0.0)
            } else {
                (
                    totals.iter().sum::<f64>() / count as f64,
                    totals.iter().copied().fold(f64::INFINITY, f64::min),
                    totals.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                )
            };
            SectionSummary {
                section: section.id.clone(),
                title: section.title.clone(),
                count,
                mean,
                min,
                max,
                max_marks: section.max_marks,
                mean_percent: percent(mean, section.max_marks),
            }
        })
        .collect();

    let mean_total = if matching.is_empty() {
        0.0
    } else {
        matching.iter().map(|e| e.total_marks).sum::<f64>() / matching.len() as f64
    };

    Summary {
        kind: rubric.kind.to_string(),
        evaluations: matching.len(),
        mean_total,
        max_marks: rubric.max_marks(),
        sections,
    }
}
