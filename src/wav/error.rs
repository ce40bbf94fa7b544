use thiserror::Error;

#[derive(Debug, Error)]
pub enum WavError {
    #[error("WAVE data is too short for a header: {0} bytes")]
    TooShort(usize),

    #[error("WAVE header field {field} at offset {offset} is {found:02X?}, expected {expected:02X?}")]
    InvalidHeaderField {
        field: &'static str,
        offset: usize,
        expected: &'static [u8],
        found: Vec<u8>,
    },

    #[error("PCM payload of {0} bytes does not fit a WAVE container")]
    PayloadTooLarge(usize),

    #[error(transparent)]
    BinRWError(#[from] binrw::Error),
}

pub type WavResult<T> = Result<T, WavError>;
