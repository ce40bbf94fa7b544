use cdda_cue::cd::error::CdError;
use cdda_cue::cue::error::CueError;
use std::path::PathBuf;
use std::result;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CddaCueError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    CdError(#[from] CdError),

    #[error(transparent)]
    CueError(#[from] CueError),

    #[error(transparent)]
    JoinError(#[from] tokio::task::JoinError),

    #[error(transparent)]
    ProgressTemplateError(#[from] indicatif::style::TemplateError),

    #[error("Output file already exists, use --force to overwrite it: {0}")]
    OutputExists(PathBuf),
}

pub type CddaCueResult<T> = result::Result<T, CddaCueError>;
