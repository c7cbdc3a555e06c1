use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::drafts::DraftSummary;
use crate::evaluation::Evaluation;
use crate::report::Summary;
use crate::rubric::Rubric;
use crate::scoring::{EvaluationScore, ItemMode};

const BAR_WIDTH: usize = 20;
const LABEL_WIDTH: usize = 28;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format marks without trailing zeros (1.5, 2, 0.25)
pub fn format_marks(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Percentage of `max`, 0 when there is no maximum
pub fn percent_of(value: f64, max: f64) -> f64 {
    if max > 0.0 {
        (value / max * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Horizontal bar of `width` cells filled in proportion to value/max
pub fn format_bar(value: f64, max: f64, width: usize) -> String {
    let filled = ((percent_of(value, max) / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a label to fit available width, accounting for Unicode
fn truncate_label(label: &str, max_width: usize) -> String {
    let chars: Vec<char> = label.chars().collect();
    if chars.len() <= max_width {
        label.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn pad(label: &str, width: usize) -> String {
    let len = label.chars().count();
    if len >= width {
        label.to_string()
    } else {
        format!("{}{}", label, " ".repeat(width - len))
    }
}

/// Section totals against their maxima, one line per section plus a total.
///
/// Bars are dropped on terminals too narrow to show them.
pub fn format_section_table(evaluation: &Evaluation, rubric: &Rubric, use_colors: bool) -> String {
    let show_bars = get_terminal_width().map_or(true, |w| w >= LABEL_WIDTH + BAR_WIDTH + 24);

    let mut lines = Vec::with_capacity(rubric.sections.len() + 2);
    let header = format!(
        "{} | {} | {}",
        rubric.title,
        evaluation.subject_id,
        if evaluation.is_submitted() { "submitted" } else { "draft" }
    );
    lines.push(if use_colors {
        header.bold().to_string()
    } else {
        header
    });

    for section in &rubric.sections {
        let total = evaluation
            .section(&section.id)
            .map(|s| s.total_marks)
            .unwrap_or(0.0);
        let label = pad(&truncate_label(&section.title, LABEL_WIDTH), LABEL_WIDTH);
        let marks = format!(
            "{:>6} / {:<5}",
            format_marks(total),
            format_marks(section.max_marks)
        );
        let pct = format!("{:>3.0}%", percent_of(total, section.max_marks));

        let line = match (show_bars, use_colors) {
            (true, true) => format!(
                "  {} {} {} {}",
                label,
                marks.bold(),
                format_bar(total, section.max_marks, BAR_WIDTH).green(),
                pct.dimmed()
            ),
            (true, false) => format!(
                "  {} {} {} {}",
                label,
                marks,
                format_bar(total, section.max_marks, BAR_WIDTH),
                pct
            ),
            (false, true) => format!("  {} {} {}", label, marks.bold(), pct.dimmed()),
            (false, false) => format!("  {} {} {}", label, marks, pct),
        };
        lines.push(line);
    }

    let max = rubric.max_marks();
    let total_line = format!(
        "  {} {:>6} / {:<5} {:>3.0}%",
        pad("Total", LABEL_WIDTH),
        format_marks(evaluation.total_marks),
        format_marks(max),
        percent_of(evaluation.total_marks, max)
    );
    lines.push(if use_colors {
        total_line.bold().to_string()
    } else {
        total_line
    });

    lines.join("\n")
}

fn judgment_tag(mode: ItemMode, availability: u8, quality: u8) -> String {
    match mode {
        ItemMode::AvailabilityOnly => format!("A:{} Q:-", availability),
        ItemMode::QualityOnly => format!("A:- Q:{}", quality),
        ItemMode::Weighted => format!("A:{} Q:{}", availability, quality),
    }
}

/// Item-by-item breakdown with observations and the overview text.
pub fn format_evaluation_detail(
    evaluation: &Evaluation,
    rubric: &Rubric,
    score: &EvaluationScore,
    use_colors: bool,
) -> String {
    let mut lines = Vec::new();

    for (section_rubric, section_score) in rubric.sections.iter().zip(&score.sections) {
        let heading = format!(
            "{} ({} / {})",
            section_rubric.title,
            format_marks(section_score.total),
            format_marks(section_rubric.max_marks)
        );
        lines.push(if use_colors {
            heading.bold().to_string()
        } else {
            heading
        });

        let section = evaluation.section(&section_rubric.id);
        for (item_rubric, item_score) in section_rubric.items.iter().zip(&section_score.items) {
            let field = section.and_then(|s| s.fields.get(&item_rubric.id));
            let (availability, quality) = field
                .map(|f| (f.availability.value(), f.quality.value()))
                .unwrap_or((0, 0));
            let tag = judgment_tag(item_rubric.mode, availability, quality);
            let awarded = format!(
                "{:>5} / {:<4}",
                format_marks(item_score.awarded),
                format_marks(item_score.marks_allocated)
            );
            let full = item_score.marks_allocated > 0.0
                && item_score.awarded >= item_score.marks_allocated;
            let tag = if !use_colors {
                tag
            } else if full {
                tag.green().to_string()
            } else if item_score.awarded > 0.0 {
                tag.yellow().to_string()
            } else {
                tag.red().to_string()
            };
            lines.push(format!("  [{}] {} {}", tag, awarded, item_rubric.label));

            if let Some(f) = field {
                if !f.observation.is_empty() {
                    let note = format!("        note: {}", f.observation);
                    lines.push(if use_colors {
                        note.dimmed().to_string()
                    } else {
                        note
                    });
                }
            }
        }
        lines.push(String::new());
    }

    let overview = &evaluation.overview;
    for (label, text) in [
        ("Strengths", &overview.strengths),
        ("Weaknesses", &overview.weaknesses),
        ("Improvement", &overview.improvement),
    ] {
        let value = if text.is_empty() { "-" } else { text.as_str() };
        lines.push(format!("{}: {}", label, value));
    }
    lines.push(format!(
        "Total: {} / {}",
        format_marks(score.total),
        format_marks(score.max_marks)
    ));

    lines.join("\n")
}

/// One line per cached draft: subject, kind, total, answered items, state and age
pub fn format_draft_list(drafts: &[DraftSummary], use_colors: bool) -> String {
    if drafts.is_empty() {
        return "No drafts found.".to_string();
    }

    drafts
        .iter()
        .map(|d| {
            let state = if d.submitted { "submitted" } else { "draft" };
            if use_colors {
                let state = if d.submitted {
                    state.green().to_string()
                } else {
                    state.yellow().to_string()
                };
                format!(
                    "{:<20} {:<15} {:>6}  {:>3} answered  {:<9}  {}",
                    d.subject_id.bold(),
                    d.kind.cyan(),
                    format_marks(d.total_marks),
                    d.answered,
                    state,
                    d.format_age().dimmed()
                )
            } else {
                format!(
                    "{:<20} {:<15} {:>6}  {:>3} answered  {:<9}  {}",
                    d.subject_id,
                    d.kind,
                    format_marks(d.total_marks),
                    d.answered,
                    state,
                    d.format_age()
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Dashboard view of a [`Summary`]
pub fn format_summary(summary: &Summary, use_colors: bool) -> String {
    if summary.evaluations == 0 {
        return format!("No {} evaluations found.", summary.kind);
    }

    let mut lines = Vec::with_capacity(summary.sections.len() + 2);
    let header = format!(
        "{} evaluations: {} | mean total {} / {}",
        summary.kind,
        summary.evaluations,
        format_marks(summary.mean_total),
        format_marks(summary.max_marks)
    );
    lines.push(if use_colors {
        header.bold().to_string()
    } else {
        header
    });

    for s in &summary.sections {
        let label = pad(&truncate_label(&s.title, LABEL_WIDTH), LABEL_WIDTH);
        let bar = format_bar(s.mean, s.max_marks, BAR_WIDTH);
        let bar = if use_colors { bar.cyan().to_string() } else { bar };
        lines.push(format!(
            "  {} mean {:>5} (min {}, max {}) / {:<5} {} {:>3.0}%",
            label,
            format_marks(s.mean),
            format_marks(s.min),
            format_marks(s.max),
            format_marks(s.max_marks),
            bar,
            s.mean_percent
        ));
    }

    lines.join("\n")
}

/// Human-readable rubric: sections, items, marks and scoring mode
pub fn format_rubric(rubric: &Rubric, use_colors: bool) -> String {
    let mut lines = Vec::new();
    let header = format!(
        "{} ({}) - {} items, max {}",
        rubric.title,
        rubric.kind,
        rubric.item_count(),
        format_marks(rubric.max_marks())
    );
    lines.push(if use_colors {
        header.bold().to_string()
    } else {
        header
    });

    for section in &rubric.sections {
        let heading = format!(
            "  {} [{}] max {}",
            section.title,
            section.id,
            format_marks(section.max_marks)
        );
        lines.push(if use_colors {
            heading.cyan().to_string()
        } else {
            heading
        });
        for item in &section.items {
            lines.push(format!(
                "    {:<24} {:>5}  {:<18} {}",
                item.id,
                format_marks(item.marks),
                item.mode.to_string(),
                item.label
            ));
        }
    }

    lines.join("\n")
}
