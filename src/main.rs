use crate::commands::cue::{normalize, split};
use crate::commands::rip::rip;
use crate::commands::{Cli, Commands};
use anyhow::Result;
use clap::Parser;
use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;

mod commands;
mod error;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let logger = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .build();

    let level = logger.filter();
    let pb = MultiProgress::new();

    LogWrapper::new(pb.clone(), logger).try_init()?;
    log::set_max_level(level);

    let cli = Cli::parse();

    match cli.command {
        Commands::Rip(cmd) => rip(cmd, pb.clone()).await?,
        Commands::Split(cmd) => split(cmd).await?,
        Commands::Normalize(cmd) => normalize(cmd).await?,
    }

    Ok(())
}
