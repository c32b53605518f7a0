pub mod create;
pub mod extract;

use std::path::PathBuf;

use clap::Args;
use drs_archive::Archive;
use miette::{Context, Result};
use tracing::info;

/// What to do with the archive, exactly one is required
#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct Mode {
    /// Extract every file of the archive into a directory
    #[arg(short, long)]
    extract: bool,

    /// Write the archive back out to a new DRS file
    #[arg(short, long)]
    create: bool,
}

#[derive(Args)]
pub struct Command {
    #[command(flatten)]
    mode: Mode,

    /// An input DRS file
    #[arg(short, long, value_name = "FILE", default_value = "interfac.drs")]
    file: PathBuf,

    #[command(flatten)]
    extract: extract::ExtractArgs,

    #[command(flatten)]
    create: create::CreateArgs,
}

impl Command {
    pub fn handle(&self) -> Result<()> {
        info!("loading {}", self.file.display());
        let archive = Archive::open(&self.file).context(format!("path: {}", self.file.display()))?;

        println!("{archive}");

        if self.mode.extract {
            self.extract.handle(&archive)
        } else {
            self.create.handle(&archive)
        }
    }
}
