use crate::commands::ensure_writable;
use crate::error::CddaCueResult;
use cdda_cue::cue::writer::serialize;
use cdda_cue::cue::{CueParser, write_cue_file, write_wave_files};
use clap::Parser;
use log::{debug, info};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Splits a WAVE+CUE capture into one WAVE file per track with a new CUE sheet.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
pub struct SplitCommand {
    /// CUE sheet referencing one or more WAVE files
    #[arg(value_name = "INPUT_CUE")]
    pub input_cue: PathBuf,

    /// Output directory, defaults to a folder named after the album title next to the CUE sheet
    #[arg(long, short = 'o', value_name = "DIR")]
    pub output: Option<PathBuf>,
}

/// Re-writes a CUE sheet in canonical form as UTF-8.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
pub struct NormalizeCommand {
    /// CUE sheet to read
    #[arg(value_name = "INPUT_CUE")]
    pub input_cue: PathBuf,

    /// Output cue file path
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Force overwrite of the output file if it already exists
    #[arg(long, short = 'f', value_name = "FORCE", default_value_t = false)]
    pub force: bool,
}

pub async fn split(cmd: SplitCommand) -> CddaCueResult<()> {
    let sheet = CueParser::new(&cmd.input_cue).parse().await?;
    let split = tokio::task::spawn_blocking(move || sheet.split_tracks()).await??;

    let name = album_dir_name(split.title.as_deref(), &cmd.input_cue);
    let output_dir = match cmd.output {
        Some(dir) => dir,
        None => cmd
            .input_cue
            .parent()
            .unwrap_or(Path::new("."))
            .join(&name),
    };
    debug!("Writing split tracks to {}", output_dir.display());
    fs::create_dir_all(&output_dir).await?;

    let written = write_wave_files(&split, &output_dir).await?;
    write_cue_file(&split, output_dir.join(format!("{name}.cue"))).await?;
    info!(
        "Split {} into {} track(s) in {}",
        cmd.input_cue.display(),
        written.len(),
        output_dir.display()
    );

    Ok(())
}

pub async fn normalize(cmd: NormalizeCommand) -> CddaCueResult<()> {
    ensure_writable(&cmd.output, cmd.force).await?;

    let sheet = CueParser::new(&cmd.input_cue).parse().await?;
    fs::write(&cmd.output, serialize(&sheet)).await?;
    info!("Wrote {}", cmd.output.display());

    Ok(())
}

/// Album title with `/` replaced, falling back to the CUE file name.
fn album_dir_name(title: Option<&str>, cue_path: &Path) -> String {
    let name = match title {
        Some(title) => title.to_string(),
        None => cue_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "split".to_string()),
    };
    name.replace('/', "_")
}
