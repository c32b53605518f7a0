use clap::Args;
use drs_archive::Archive;
use miette::{Context, Result};
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct CreateArgs {
    /// A target DRS file
    #[arg(short, long, value_name = "FILE", default_value = "generated.drs")]
    output: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl CreateArgs {
    pub fn handle(&self, archive: &Archive) -> Result<()> {
        info!("creating {}", self.output.display());

        archive
            .save(&self.output, self.overwrite)
            .context(format!("creating {}", self.output.display()))?;

        Ok(())
    }
}
