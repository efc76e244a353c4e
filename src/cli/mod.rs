//! CLI command implementations

pub mod error;
pub mod fetch;
pub mod report;

pub use error::CliError;
pub use fetch::{Cli, Commands, FetchArgs};
pub use report::ReportArgs;
