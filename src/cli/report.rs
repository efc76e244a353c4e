//! Report command implementation

use std::path::PathBuf;

use clap::Args;

use crate::output::{PostCollection, TargetPaths};
use crate::report::Breakdown;

use super::CliError;

/// Arguments for the report command
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Target topic/profile identifier
    pub target: String,

    /// Root directory holding fetched collections
    #[arg(long, default_value = "posts")]
    pub out_dir: PathBuf,

    /// Read this collection file instead of the target's combined collection
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl ReportArgs {
    /// Load the target's combined collection and print its breakdown.
    ///
    /// # Errors
    /// Returns [`CliError`] if the collection cannot be read.
    pub fn execute(&self) -> Result<(), CliError> {
        let path = match &self.file {
            Some(file) => file.clone(),
            None => TargetPaths::new(&self.out_dir, &self.target).all_posts_file(),
        };

        let collection = PostCollection::load(&path)?;
        let breakdown = Breakdown::compute(&collection.data);
        print!("{breakdown}");
        Ok(())
    }
}
