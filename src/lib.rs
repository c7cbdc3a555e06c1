pub mod config;
pub mod credentials;
pub mod drafts;
pub mod evaluation;
pub mod output;
pub mod prompt;
pub mod report;
pub mod rubric;
pub mod scoring;
pub mod session;
pub mod submit;
pub mod wizard;
