use crate::rubric::{Rubric, SectionRubric};

/// One page of the evaluation form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step<'a> {
    Section(&'a SectionRubric),
    Overview,
}

/// Cursor over the pages of an evaluation: one per rubric section, then the
/// free-text overview.
#[derive(Debug, Clone)]
pub struct Steps<'a> {
    rubric: &'a Rubric,
    index: usize,
}

impl<'a> Steps<'a> {
    pub fn new(rubric: &'a Rubric) -> Self {
        Self { rubric, index: 0 }
    }

    pub fn page_count(&self) -> usize {
        self.rubric.sections.len() + 1
    }

    pub fn current(&self) -> Step<'a> {
        match self.rubric.sections.get(self.index) {
            Some(section) => Step::Section(section),
            None => Step::Overview,
        }
    }

    /// 1-based position and page count, e.g. `(2, 5)`.
    pub fn position(&self) -> (usize, usize) {
        (self.index + 1, self.page_count())
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.page_count()
    }

    /// Advance one page. Returns false when already on the last page.
    pub fn next_page(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Go back one page. Returns false when already on the first page.
    pub fn prev_page(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Jump to the page of a section. Returns false if there is no such section.
    pub fn jump_to(&mut self, section_id: &str) -> bool {
        match self.rubric.sections.iter().position(|s| s.id == section_id) {
            Some(index) => {
                self.index = index;
                true
            }
            None => false,
        }
    }
}
