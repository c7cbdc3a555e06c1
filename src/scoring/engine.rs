use super::mark::{BinaryMark, ScoreError};
use super::mode::ItemMode;
use super::weights::Weights;
use crate::evaluation::{Evaluation, EvaluationField, Section};
use crate::rubric::{Rubric, SectionRubric};

/// How one item's marks were earned.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemScore {
    pub item: String,
    pub mode: ItemMode,
    pub marks_allocated: f64,
    pub availability_part: f64,
    pub quality_part: f64,
    pub awarded: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionScore {
    pub section: String,
    pub total: f64,
    pub max_marks: f64,
    pub items: Vec<ItemScore>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationScore {
    pub total: f64,
    pub max_marks: f64,
    pub sections: Vec<SectionScore>,
}

/// Split an item's marks into the availability and quality contributions.
fn item_parts(field: &EvaluationField, marks: f64, weights: Weights, mode: ItemMode) -> (f64, f64) {
    match mode {
        ItemMode::AvailabilityOnly => (if field.availability.is_yes() { marks } else { 0.0 }, 0.0),
        ItemMode::QualityOnly => (0.0, if field.quality.is_yes() { marks } else { 0.0 }),
        ItemMode::Weighted => {
            let availability = if field.availability.is_yes() {
                marks * weights.availability
            } else {
                0.0
            };
            let quality = if field.quality.is_yes() {
                marks * weights.quality
            } else {
                0.0
            };
            (availability, quality)
        }
    }
}

/// Marks obtained for one item. Inputs are assumed valid; see [`score`] for
/// the checked form.
pub fn score_item(field: &EvaluationField, marks: f64, weights: Weights, mode: ItemMode) -> f64 {
    let (availability, quality) = item_parts(field, marks, weights, mode);
    availability + quality
}

fn check_marks(marks: f64) -> Result<(), ScoreError> {
    if !marks.is_finite() || marks < 0.0 {
        return Err(ScoreError::InvalidInput(format!(
            "marks allocated must be a non-negative number, got {}",
            marks
        )));
    }
    Ok(())
}

/// Flag-based scoring contract.
///
/// Quality N/A is checked first, then availability N/A, otherwise the two
/// judgments are blended by the weights.
pub fn score(
    field: &EvaluationField,
    marks_allocated: f64,
    availability_weight: f64,
    quality_weight: f64,
    quality_is_na: bool,
    availability_is_na: bool,
) -> Result<f64, ScoreError> {
    check_marks(marks_allocated)?;
    let weights = Weights::new(availability_weight, quality_weight)?;
    let mode = ItemMode::from_flags(quality_is_na, availability_is_na)?;
    Ok(score_item(field, marks_allocated, weights, mode))
}

/// Same as [`score`] but takes the raw judgments as captured from input.
pub fn score_raw(
    availability: u8,
    quality: u8,
    marks_allocated: f64,
    availability_weight: f64,
    quality_weight: f64,
    quality_is_na: bool,
    availability_is_na: bool,
) -> Result<f64, ScoreError> {
    let field = EvaluationField {
        availability: BinaryMark::try_from(availability)?,
        quality: BinaryMark::try_from(quality)?,
        observation: String::new(),
    };
    score(
        &field,
        marks_allocated,
        availability_weight,
        quality_weight,
        quality_is_na,
        availability_is_na,
    )
}

/// Score every item of a section against its rubric entry.
///
/// The section must hold exactly the rubric's items.
pub fn section_total(
    section: &Section,
    rubric: &SectionRubric,
    weights: Weights,
) -> Result<SectionScore, ScoreError> {
    if let Some(unknown) = section.fields.keys().find(|key| rubric.item(key).is_none()) {
        return Err(ScoreError::UnknownItem {
            section: section.id.clone(),
            item: unknown.clone(),
        });
    }

    let mut total = 0.0;
    let mut items = Vec::with_capacity(rubric.items.len());
    for item in &rubric.items {
        let field = section
            .fields
            .get(&item.id)
            .ok_or_else(|| ScoreError::MissingItem {
                section: section.id.clone(),
                item: item.id.clone(),
            })?;
        let (availability_part, quality_part) = item_parts(field, item.marks, weights, item.mode);
        let awarded = availability_part + quality_part;
        total += awarded;
        items.push(ItemScore {
            item: item.id.clone(),
            mode: item.mode,
            marks_allocated: item.marks,
            availability_part,
            quality_part,
            awarded,
        });
    }

    Ok(SectionScore {
        section: section.id.clone(),
        total,
        max_marks: rubric.max_marks,
        items,
    })
}

/// Score a whole evaluation. The grand total is the sum of section totals.
pub fn grand_total(
    evaluation: &Evaluation,
    rubric: &Rubric,
    weights: Weights,
) -> Result<EvaluationScore, ScoreError> {
    if let Some(unknown) = evaluation
        .sections
        .iter()
        .find(|s| rubric.section(&s.id).is_none())
    {
        return Err(ScoreError::UnknownSection(unknown.id.clone()));
    }

    let mut sections = Vec::with_capacity(rubric.sections.len());
    for section_rubric in &rubric.sections {
        let section = evaluation
            .section(&section_rubric.id)
            .ok_or_else(|| ScoreError::MissingSection(section_rubric.id.clone()))?;
        sections.push(section_total(section, section_rubric, weights)?);
    }

    Ok(EvaluationScore {
        total: sections.iter().map(|s| s.total).sum(),
        max_marks: rubric.max_marks(),
        sections,
    })
}
