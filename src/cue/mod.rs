use crate::cue::encoding::decode_text;
use crate::cue::error::{CueError, CueResult};
use crate::cue::models::CueSheet;
use crate::cue::parser::parse_cue;
use crate::cue::writer::serialize;
use log::{debug, info};
use std::path::{Path, PathBuf};

pub mod encoding;
pub mod error;
pub mod models;
pub mod parser;
pub mod split;
pub mod writer;

/// Loads a CUE sheet and the WAVE files it references. File names are
/// resolved relative to the directory of the sheet.
pub struct CueParser {
    cue_path: PathBuf,
}

impl CueParser {
    pub fn new(cue_path: impl AsRef<Path>) -> Self {
        Self {
            cue_path: cue_path.as_ref().to_path_buf(),
        }
    }

    pub async fn parse(&self) -> CueResult<CueSheet> {
        let bytes = tokio::fs::read(&self.cue_path).await?;
        let text = decode_text(&bytes)?;
        let base_dir = self
            .cue_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let sheet = tokio::task::spawn_blocking(move || {
            parse_cue(&text, |filename| {
                let path = base_dir.join(filename);
                debug!("Loading WAVE file {}", path.display());
                std::fs::read(&path).map_err(|source| CueError::WaveFileError { file: path, source })
            })
        })
        .await??;

        info!(
            "Loaded {} with {} file(s)",
            self.cue_path.display(),
            sheet.files.len()
        );

        Ok(sheet)
    }
}

/// Writes the sheet as UTF-8 CUE text.
pub async fn write_cue_file(sheet: &CueSheet, path: impl AsRef<Path>) -> CueResult<()> {
    let path = path.as_ref();
    tokio::fs::write(path, serialize(sheet)).await?;
    info!("Wrote {}", path.display());
    Ok(())
}

/// Writes the payload of every WAVE file of the sheet into `dir`.
pub async fn write_wave_files(sheet: &CueSheet, dir: impl AsRef<Path>) -> CueResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut written = Vec::new();

    for file in &sheet.files {
        if !file.filename.to_ascii_lowercase().ends_with(".wav") {
            debug!("Skipping {}, not a .wav file", file.filename);
            continue;
        }

        let path = dir.join(&file.filename);
        tokio::fs::write(&path, &file.data).await?;
        info!("Wrote {} ({} bytes)", path.display(), file.data.len());
        written.push(path);
    }

    Ok(written)
}
