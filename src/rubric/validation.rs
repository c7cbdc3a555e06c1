use std::collections::HashSet;

use super::types::Rubric;

const MARKS_TOLERANCE: f64 = 1e-9;

/// Validate a rubric before it is used for scoring.
/// Returns all validation errors at once (not just the first).
pub fn validate_rubric(rubric: &Rubric) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if rubric.sections.is_empty() {
        errors.push(format!("{}: rubric has no sections", rubric.kind));
    }

    let mut section_ids = HashSet::new();
    for (i, section) in rubric.sections.iter().enumerate() {
        let at = format!("{}.sections[{}]", rubric.kind, i);

        if section.id.trim().is_empty() {
            errors.push(format!("{}.id: must not be empty", at));
        } else if !section_ids.insert(section.id.as_str()) {
            errors.push(format!("{}.id: duplicate section '{}'", at, section.id));
        }

        if !section.max_marks.is_finite() || section.max_marks <= 0.0 {
            errors.push(format!(
                "{}.max_marks: must be positive, got {}",
                at, section.max_marks
            ));
        }

        if section.items.is_empty() {
            errors.push(format!("{}: section '{}' has no items", at, section.id));
        }

        let mut item_ids = HashSet::new();
        for (j, item) in section.items.iter().enumerate() {
            if item.id.trim().is_empty() {
                errors.push(format!("{}.items[{}].id: must not be empty", at, j));
            } else if !item_ids.insert(item.id.as_str()) {
                errors.push(format!("{}.items[{}].id: duplicate item '{}'", at, j, item.id));
            }
            if !item.marks.is_finite() || item.marks < 0.0 {
                errors.push(format!(
                    "{}.items[{}].marks: must be non-negative, got {}",
                    at, j, item.marks
                ));
            }
        }

        let allocated = section.allocated();
        if allocated.is_finite() && allocated > section.max_marks + MARKS_TOLERANCE {
            errors.push(format!(
                "{}: allocated marks {} exceed max_marks {}",
                at, allocated, section.max_marks
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
