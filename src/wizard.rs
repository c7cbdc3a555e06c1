//! Interactive, page-by-page form for filling in an evaluation.
//!
//! Every answer is written to the draft cache as soon as it is given, so an
//! interrupted session can be resumed with `inspect-score fill <subject>`.

use anyhow::Result;
use log::debug;
use owo_colors::OwoColorize;

use crate::evaluation::{Evaluation, FieldPatch, OverviewPatch, Step, Steps};
use crate::output::{format_marks, format_section_table, should_use_colors};
use crate::prompt::{prompt, prompt_judgment};
use crate::rubric::{Rubric, SectionRubric};
use crate::session::Session;

/// Navigation choice entered between pages.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Nav {
    Next,
    Prev,
    Jump(String),
    Quit,
}

fn parse_nav(input: &str) -> Option<Nav> {
    let input = input.trim();
    let (word, rest) = match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    };
    match (word.to_lowercase().as_str(), rest) {
        ("" | "n" | "next", "") => Some(Nav::Next),
        ("p" | "prev" | "b" | "back", "") => Some(Nav::Prev),
        ("q" | "quit", "") => Some(Nav::Quit),
        ("j" | "jump", id) if !id.is_empty() => Some(Nav::Jump(id.to_string())),
        _ => None,
    }
}

/// Empty input keeps the current text, `-` clears it.
fn parse_text_answer(input: &str) -> Option<String> {
    match input.trim() {
        "" => None,
        "-" => Some(String::new()),
        other => Some(other.to_string()),
    }
}

fn prompt_text(label: &str, current: &str) -> Result<Option<String>> {
    let message = if current.is_empty() {
        format!("{} (optional): ", label)
    } else {
        format!("{} [{}] ('-' clears): ", label, current)
    };
    Ok(parse_text_answer(&prompt(&message)?))
}

fn fill_section(
    session: &Session,
    evaluation: &mut Evaluation,
    rubric: &Rubric,
    section: &SectionRubric,
    use_colors: bool,
) -> Result<()> {
    for item in &section.items {
        let current = evaluation
            .section(&section.id)
            .and_then(|s| s.fields.get(&item.id))
            .cloned()
            .unwrap_or_default();

        let heading = format!("  {}", item.label);
        if use_colors {
            println!("\n{} ({} marks, {})", heading.bold(), format_marks(item.marks), item.mode);
        } else {
            println!("\n{} ({} marks, {})", heading, format_marks(item.marks), item.mode);
        }

        let mut patch = FieldPatch::default();
        if item.mode.asks_availability() {
            patch.availability = Some(prompt_judgment("    Available?", current.availability)?);
        }
        if item.mode.asks_quality() {
            patch.quality = Some(prompt_judgment("    Adequate quality?", current.quality)?);
        }
        patch.observation = prompt_text("    Observation", &current.observation)?;

        evaluation.update_field(&section.id, &item.id, &patch, rubric, session.weights)?;
        session.persist(evaluation)?;
        debug!("Saved {}/{} for {}", section.id, item.id, evaluation.subject_id);
    }
    Ok(())
}

fn fill_overview(session: &Session, evaluation: &mut Evaluation) -> Result<()> {
    let current = evaluation.overview.clone();
    let patch = OverviewPatch {
        strengths: prompt_text("  Strengths", &current.strengths)?,
        weaknesses: prompt_text("  Weaknesses", &current.weaknesses)?,
        improvement: prompt_text("  Areas for improvement", &current.improvement)?,
    };
    evaluation.update_overview(&patch)?;
    session.persist(evaluation)?;
    Ok(())
}

fn prompt_nav(steps: &Steps) -> Result<Nav> {
    let hint = if steps.is_last() {
        "[Enter] finish, [p]rev, [j]ump <section>, [q]uit"
    } else {
        "[Enter] next, [p]rev, [j]ump <section>, [q]uit"
    };
    loop {
        let input = prompt(&format!("{}: ", hint))?;
        match parse_nav(&input) {
            Some(nav) => return Ok(nav),
            None => println!("  Unrecognized choice '{}'", input),
        }
    }
}

/// Walk the user through every section and the overview of `evaluation`.
pub fn run_fill_wizard(
    session: &Session,
    evaluation: &mut Evaluation,
    rubric: &Rubric,
) -> Result<()> {
    if evaluation.is_submitted() {
        anyhow::bail!(
            "Evaluation for '{}' has already been submitted and can no longer be edited",
            evaluation.subject_id
        );
    }

    let use_colors = should_use_colors();
    let mut steps = Steps::new(rubric);

    println!(
        "{} for {}. Enter keeps the current answer; progress is saved after every answer.",
        rubric.title, evaluation.subject_id
    );

    loop {
        let (position, count) = steps.position();
        match steps.current() {
            Step::Section(section) => {
                let total = evaluation
                    .section(&section.id)
                    .map(|s| s.total_marks)
                    .unwrap_or(0.0);
                let title = format!("Step {}/{}: {}", position, count, section.title);
                let marks = format!(
                    "({} / {})",
                    format_marks(total),
                    format_marks(section.max_marks)
                );
                if use_colors {
                    println!("\n{} {}", title.bold().cyan(), marks.dimmed());
                } else {
                    println!("\n{} {}", title, marks);
                }
                fill_section(session, evaluation, rubric, section, use_colors)?;
            }
            Step::Overview => {
                let title = format!("Step {}/{}: Overview", position, count);
                if use_colors {
                    println!("\n{}", title.bold().cyan());
                } else {
                    println!("\n{}", title);
                }
                fill_overview(session, evaluation)?;
            }
        }

        match prompt_nav(&steps)? {
            Nav::Next => {
                if !steps.next_page() {
                    break;
                }
            }
            Nav::Prev => {
                if !steps.prev_page() {
                    println!("  Already on the first page");
                }
            }
            Nav::Jump(id) => {
                if !steps.jump_to(&id) {
                    println!("  No section '{}' in this rubric", id);
                }
            }
            Nav::Quit => {
                println!(
                    "Draft saved. Resume with `inspect-score fill {}`",
                    evaluation.subject_id
                );
                return Ok(());
            }
        }
    }

    println!();
    print!("{}", format_section_table(evaluation, rubric, use_colors));
    println!(
        "Draft saved. Send it with `inspect-score submit {}`",
        evaluation.subject_id
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nav() {
        assert_eq!(parse_nav(""), Some(Nav::Next));
        assert_eq!(parse_nav(" N "), Some(Nav::Next));
        assert_eq!(parse_nav("back"), Some(Nav::Prev));
        assert_eq!(parse_nav("q"), Some(Nav::Quit));
        assert_eq!(parse_nav("j finance"), Some(Nav::Jump("finance".to_string())));
        assert_eq!(parse_nav("jump   lan "), Some(Nav::Jump("lan".to_string())));
        assert_eq!(parse_nav("j"), None);
        assert_eq!(parse_nav("next please"), None);
        assert_eq!(parse_nav("x"), None);
    }

    #[test]
    fn test_parse_text_answer() {
        assert_eq!(parse_text_answer("  "), None);
        assert_eq!(parse_text_answer("-"), Some(String::new()));
        assert_eq!(
            parse_text_answer(" Roof leaks in block B "),
            Some("Roof leaks in block B".to_string())
        );
    }
}
