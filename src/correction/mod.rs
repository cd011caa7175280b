pub mod client;
pub mod error;
pub mod models;

pub use client::{CorrectionService, HttpCorrectionClient};
pub use error::ClientError;
pub use models::{CorrectionRequest, CorrectionResult, GrammarIssue, Rewrites};
