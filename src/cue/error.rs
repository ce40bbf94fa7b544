use crate::wav::error::WavError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CueError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("Unsupported CUE line: \"{0}\"")]
    InvalidLine(String),

    #[error("Could not read WAVE file {file}: {source}")]
    WaveFileError {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid WAVE file {file}: {source}")]
    InvalidWave {
        file: String,
        #[source]
        source: WavError,
    },

    #[error("Could not determine the text encoding of the CUE sheet")]
    EncodingUndetermined,

    #[error("Invalid timecode: \"{0}\"")]
    InvalidTimecode(String),

    #[error("Track {0} has no INDEX 01")]
    MissingIndex01(u32),

    #[error("Track {track} spans bytes {start}..{end} outside of {file} ({len} bytes)")]
    SliceOutOfRange {
        file: String,
        track: u32,
        start: u64,
        end: u64,
        len: usize,
    },

    #[error(transparent)]
    WavError(#[from] WavError),

    #[error(transparent)]
    JoinError(#[from] tokio::task::JoinError),
}

pub type CueResult<T> = Result<T, CueError>;
