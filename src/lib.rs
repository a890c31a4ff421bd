pub mod config;
pub mod dataset;
pub mod error;
pub mod generation;
pub mod http;
pub mod prompt;
pub mod reformat;
pub mod summary;

pub use error::{HostSummaryError, Result};
pub use summary::{HostSummary, SummaryService};
