use crate::commands::cue::{NormalizeCommand, SplitCommand};
use crate::commands::rip::RipCommand;
use crate::error::{CddaCueError, CddaCueResult};
use clap::{Parser, Subcommand};
use std::path::Path;
use tokio::fs;

pub mod cue;
pub mod rip;

/// CLI for bit-exact CD-DA ripping and for splitting WAVE+CUE captures.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Rip(RipCommand),
    Split(SplitCommand),
    Normalize(NormalizeCommand),
}

async fn ensure_writable(output: &Path, force: bool) -> CddaCueResult<()> {
    if fs::metadata(output).await.is_ok() && !force {
        return Err(CddaCueError::OutputExists(output.to_path_buf()));
    }
    Ok(())
}
