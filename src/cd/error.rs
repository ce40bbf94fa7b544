use crate::wav::error::WavError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CdError {
    #[error("Device {operation} failed at LBA {lba}: {source}")]
    DeviceIo {
        operation: &'static str,
        lba: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("Device {operation} failed: {source}")]
    DeviceControl {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Verification pass {pass} differs from the first read at byte {first_difference}")]
    VerificationMismatch { pass: u32, first_difference: usize },

    #[error("TOC response is too short: {0} bytes")]
    TocTooShort(usize),

    #[error("TOC descriptor for point {0:#04x} not found")]
    TocPointNotFound(u8),

    #[error("Lead-out LBA {lead_out} is before the first track LBA {first_track}")]
    InvalidCaptureRange { first_track: u32, lead_out: u32 },

    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    #[error(transparent)]
    WavError(#[from] WavError),
}

pub type CdResult<T> = Result<T, CdError>;
