pub mod client;
pub mod payload;

pub use client::{create_client, submission_url, submit_evaluation, SubmitError};
pub use payload::{SubmissionPayload, SubmissionReceipt};
