pub mod formatter;

pub use formatter::{
    format_bar, format_draft_list, format_evaluation_detail, format_marks, format_rubric,
    format_section_table, format_summary, percent_of, should_use_colors,
};
