use clap::Args;
use drs_archive::extract::{extract_all, ExtractOptions, DEFAULT_MAX_ATTEMPTS};
use drs_archive::Archive;
use miette::{Context, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Args)]
pub struct ExtractArgs {
    /// A target directory
    #[arg(short, long, value_name = "DIR", default_value = "drs_files")]
    directory: PathBuf,

    /// Alternate names to try for a file whose name is taken
    #[arg(long, value_name = "COUNT", default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,
}

impl ExtractArgs {
    pub fn handle(&self, archive: &Archive) -> Result<()> {
        info!("extracting into {}", self.directory.display());

        let options = ExtractOptions::builder()
            .max_attempts(self.max_attempts)
            .build();
        let report = extract_all(archive, &self.directory, options)
            .context(format!("extracting into {}", self.directory.display()))?;

        for (wanted, used) in &report.renamed {
            println!(
                "{} {} -> {}",
                "renamed".yellow(),
                wanted.display(),
                used.display()
            );
        }
        for err in &report.skipped {
            println!("{} {err}", "skipped".red());
        }
        for err in &report.failed {
            println!("{} {err}", "failed".red());
        }

        println!(
            "{} {} of {} files",
            "extracted".green(),
            report.written.len(),
            archive.len()
        );

        if !report.is_complete() {
            warn!(
                skipped = report.skipped.len(),
                failed = report.failed.len(),
                "some files were not extracted"
            );
        }

        Ok(())
    }
}
