#![forbid(unsafe_code)]

pub mod archive;
pub mod config;
pub mod document;
pub mod error;
pub mod pacer;
pub mod policy;
pub mod requirements;
pub mod scanner;
pub mod search;
pub mod submission;
pub mod validate;
pub mod workspace;

// Re-exports: stable API surface
pub use archive::extract;
pub use config::AppConfig;
pub use error::{Result, SubcheckError};
pub use policy::ExtractPolicy;
pub use requirements::RequirementsTable;
pub use scanner::{MatchRecord, ScanOutcome, Scanner};
pub use search::{CustomSearchClient, SearchClient, SearchConfig, SearchHit};
pub use submission::{FileReport, SubmissionContext, SubmissionReport, process};
pub use validate::{ValidationResult, validate};
pub use workspace::{RequestScope, Workspace};
