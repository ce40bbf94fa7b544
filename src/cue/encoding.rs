use crate::cue::error::{CueError, CueResult};
use encoding_rs::{EUC_JP, Encoding, SHIFT_JIS};
use log::debug;

/// Legacy encodings tried, in order, when the text is not UTF-8.
const LEGACY_ENCODINGS: [&Encoding; 2] = [SHIFT_JIS, EUC_JP];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decodes CUE sheet bytes, accepting the first encoding that decodes
/// without malformed sequences.
pub fn decode_text(bytes: &[u8]) -> CueResult<String> {
    let utf8 = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(utf8) {
        return Ok(text.to_string());
    }

    for encoding in LEGACY_ENCODINGS {
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            debug!("Decoded CUE sheet as {}", encoding.name());
            return Ok(text.into_owned());
        }
    }

    Err(CueError::EncodingUndetermined)
}
