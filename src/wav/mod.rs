// src/wav/mod.rs
use crate::wav::error::{WavError, WavResult};
use binrw::{BinRead, BinWrite};
use byteorder::{ByteOrder, LittleEndian};
use log::warn;
use std::io::Cursor;

pub mod error;

pub const SAMPLE_RATE: u32 = 44100;
pub const CHANNELS: u16 = 2;
pub const BITS_PER_SAMPLE: u16 = 16;
/// Bytes in one stereo sample frame (block align).
pub const BYTES_PER_SAMPLE: usize = (CHANNELS as usize) * (BITS_PER_SAMPLE as usize / 8);
pub const BYTE_RATE: u32 = SAMPLE_RATE * BYTES_PER_SAMPLE as u32;
/// Bytes of PCM per CD frame (1/75 s). Numerically equal to the raw sector size.
pub const CD_FRAME_BYTES: usize = BYTE_RATE as usize / 75;

pub const WAV_HEADER_SIZE: usize = 44;
const FMT_CHUNK_SIZE: u32 = 16;
const FORMAT_PCM: u16 = 1;
/// RIFF size counts everything after the first 8 bytes.
const RIFF_SIZE_EXTRA: usize = WAV_HEADER_SIZE - 8;

const RIFF_SIZE_OFFSET: usize = 4;
const DATA_SIZE_OFFSET: usize = 40;

/// Header fields that must match byte-for-byte, as `(name, offset, bytes)`.
const FIXED_FIELDS: [(&str, usize, &[u8]); 11] = [
    ("RIFF tag", 0, b"RIFF"),
    ("WAVE tag", 8, b"WAVE"),
    ("fmt tag", 12, b"fmt "),
    ("fmt chunk size", 16, &[0x10, 0x00, 0x00, 0x00]),
    ("format", 20, &[0x01, 0x00]),
    ("channels", 22, &[0x02, 0x00]),
    ("sample rate", 24, &[0x44, 0xAC, 0x00, 0x00]),
    ("byte rate", 28, &[0x10, 0xB1, 0x02, 0x00]),
    ("block align", 32, &[0x04, 0x00]),
    ("bits per sample", 34, &[0x10, 0x00]),
    ("data tag", 36, b"data"),
];

/// Canonical 44-byte RIFF/WAVE header for 16-bit 44.1 kHz stereo PCM.
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct WavHeader {
    pub riff_tag: [u8; 4],
    pub riff_size: u32,
    pub wave_tag: [u8; 4],
    pub fmt_tag: [u8; 4],
    pub fmt_size: u32,
    pub format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_tag: [u8; 4],
    pub data_size: u32,
}

impl WavHeader {
    pub fn canonical(payload_len: usize) -> WavResult<Self> {
        let data_size = checked_data_size(payload_len)?;

        Ok(Self {
            riff_tag: *b"RIFF",
            riff_size: data_size + RIFF_SIZE_EXTRA as u32,
            wave_tag: *b"WAVE",
            fmt_tag: *b"fmt ",
            fmt_size: FMT_CHUNK_SIZE,
            format: FORMAT_PCM,
            channels: CHANNELS,
            sample_rate: SAMPLE_RATE,
            byte_rate: BYTE_RATE,
            block_align: BYTES_PER_SAMPLE as u16,
            bits_per_sample: BITS_PER_SAMPLE,
            data_tag: *b"data",
            data_size,
        })
    }

    /// Validates and decodes the header at the start of `data`.
    pub fn parse(data: &[u8]) -> WavResult<Self> {
        validate_header(data)?;
        Ok(Self::read(&mut Cursor::new(&data[..WAV_HEADER_SIZE]))?)
    }

    pub fn to_bytes(&self) -> WavResult<[u8; WAV_HEADER_SIZE]> {
        let mut buf = [0u8; WAV_HEADER_SIZE];
        self.write(&mut Cursor::new(&mut buf[..]))?;
        Ok(buf)
    }
}

fn checked_data_size(payload_len: usize) -> WavResult<u32> {
    u32::try_from(payload_len)
        .ok()
        .filter(|len| len.checked_add(RIFF_SIZE_EXTRA as u32).is_some())
        .ok_or(WavError::PayloadTooLarge(payload_len))
}

/// Checks every fixed field of the canonical header. Only the two size
/// fields are allowed to vary.
pub fn validate_header(data: &[u8]) -> WavResult<()> {
    if data.len() < WAV_HEADER_SIZE {
        return Err(WavError::TooShort(data.len()));
    }

    for (field, offset, expected) in FIXED_FIELDS {
        let found = &data[offset..offset + expected.len()];
        if found != expected {
            return Err(WavError::InvalidHeaderField {
                field,
                offset,
                expected,
                found: found.to_vec(),
            });
        }
    }

    Ok(())
}

/// Builds the header for a slice of `source`: the RIFF tag and the whole fmt
/// sub-chunk are copied, only the two sizes are rewritten.
pub fn derive_header(source: &[u8], payload_len: usize) -> WavResult<[u8; WAV_HEADER_SIZE]> {
    if source.len() < WAV_HEADER_SIZE {
        return Err(WavError::TooShort(source.len()));
    }
    let data_size = checked_data_size(payload_len)?;

    let mut header = [0u8; WAV_HEADER_SIZE];
    header.copy_from_slice(&source[..WAV_HEADER_SIZE]);
    LittleEndian::write_u32(
        &mut header[RIFF_SIZE_OFFSET..RIFF_SIZE_OFFSET + 4],
        data_size + RIFF_SIZE_EXTRA as u32,
    );
    LittleEndian::write_u32(&mut header[DATA_SIZE_OFFSET..DATA_SIZE_OFFSET + 4], data_size);

    Ok(header)
}

/// Shifts the capture by `sample_offset` samples while keeping its length.
///
/// A negative offset moves audio earlier: zeros are prepended and the tail
/// is dropped. A positive offset drops leading samples and pads the end.
pub fn shift_samples(mut pcm: Vec<u8>, sample_offset: i32) -> Vec<u8> {
    let len = pcm.len();
    let mut shift = sample_offset.unsigned_abs() as usize * BYTES_PER_SAMPLE;
    if shift > len {
        warn!(
            "Sample offset {} exceeds the capture length, output is silence",
            sample_offset
        );
        shift = len;
    }

    if sample_offset < 0 {
        pcm.truncate(len - shift);
        let mut shifted = vec![0u8; shift];
        shifted.append(&mut pcm);
        shifted
    } else {
        pcm.drain(..shift);
        pcm.resize(len, 0);
        pcm
    }
}

/// Wraps PCM in a canonical WAV container after applying the sample offset.
pub fn assemble(pcm: Vec<u8>, sample_offset: i32) -> WavResult<Vec<u8>> {
    let pcm = shift_samples(pcm, sample_offset);
    let header = WavHeader::canonical(pcm.len())?.to_bytes()?;

    let mut wav = Vec::with_capacity(WAV_HEADER_SIZE + pcm.len());
    wav.extend_from_slice(&header);
    wav.extend_from_slice(&pcm);
    Ok(wav)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical_wav(payload: &[u8]) -> Vec<u8> {
        assemble(payload.to_vec(), 0).unwrap()
    }

    #[test]
    fn canonical_header_bytes() {
        let header = WavHeader::canonical(8).unwrap().to_bytes().unwrap();
        assert_eq!(&header[0..4], b"RIFF");
        assert_eq!(&header[4..8], &44u32.to_le_bytes());
        assert_eq!(&header[8..16], b"WAVEfmt ");
        assert_eq!(&header[24..28], &44100u32.to_le_bytes());
        assert_eq!(&header[28..32], &176400u32.to_le_bytes());
        assert_eq!(&header[36..40], b"data");
        assert_eq!(&header[40..44], &8u32.to_le_bytes());
        validate_header(&header).unwrap();
    }

    #[test]
    fn cd_frame_bytes_equals_raw_sector_size() {
        assert_eq!(CD_FRAME_BYTES, crate::cd::RAW_SECTOR_SIZE);
        assert_eq!(BYTES_PER_SAMPLE, 4);
    }

    #[test]
    fn validator_accepts_canonical_header_with_payload() {
        let wav = canonical_wav(&[1, 2, 3, 4]);
        let header = WavHeader::parse(&wav).unwrap();
        assert_eq!(header.data_size, 4);
        assert_eq!(header.riff_size, 40);
    }

    #[test]
    fn validator_rejects_short_buffers() {
        let wav = canonical_wav(&[]);
        assert!(matches!(
            validate_header(&wav[..43]),
            Err(WavError::TooShort(43))
        ));
    }

    #[test]
    fn validator_rejects_every_altered_fixed_field() {
        let wav = canonical_wav(&[0; 16]);
        for (field, offset, _) in FIXED_FIELDS {
            let mut altered = wav.clone();
            altered[offset] ^= 0x01;
            match validate_header(&altered) {
                Err(WavError::InvalidHeaderField { field: f, .. }) => assert_eq!(f, field),
                other => panic!("{field} not rejected: {other:?}"),
            }
        }
    }

    #[test]
    fn validator_ignores_size_fields() {
        let mut wav = canonical_wav(&[0; 16]);
        wav[4..8].copy_from_slice(&[0xFF; 4]);
        wav[40..44].copy_from_slice(&[0xFF; 4]);
        validate_header(&wav).unwrap();
    }

    #[test]
    fn negative_offset_prepends_silence_and_drops_tail() {
        let shifted = shift_samples(vec![1, 2, 3, 4, 5, 6, 7, 8], -1);
        assert_eq!(shifted, vec![0, 0, 0, 0, 1, 2, 3, 4]);

        let shifted = shift_samples(vec![9, 9, 9, 9], -1);
        assert_eq!(shifted, vec![0, 0, 0, 0]);
    }

    #[test]
    fn positive_offset_drops_head_and_pads_tail() {
        let shifted = shift_samples(vec![1, 2, 3, 4, 5, 6, 7, 8], 1);
        assert_eq!(shifted, vec![5, 6, 7, 8, 0, 0, 0, 0]);
    }

    #[test]
    fn zero_offset_keeps_capture() {
        assert_eq!(shift_samples(vec![1, 2, 3, 4], 0), vec![1, 2, 3, 4]);
    }

    #[test]
    fn oversized_offset_yields_silence_of_same_length() {
        assert_eq!(shift_samples(vec![1; 8], 5), vec![0; 8]);
        assert_eq!(shift_samples(vec![1; 8], -5), vec![0; 8]);
    }

    #[test]
    fn assembled_sizes_track_payload() {
        let wav = assemble(vec![7; 12], 1).unwrap();
        assert_eq!(wav.len(), WAV_HEADER_SIZE + 12);
        assert_eq!(LittleEndian::read_u32(&wav[4..8]), 48);
        assert_eq!(LittleEndian::read_u32(&wav[40..44]), 12);
        assert_eq!(&wav[WAV_HEADER_SIZE..], &[7, 7, 7, 7, 7, 7, 7, 7, 0, 0, 0, 0]);
    }

    #[test]
    fn derived_header_keeps_format_and_rewrites_sizes() {
        let source = canonical_wav(&[0; 100]);
        let header = derive_header(&source, 20).unwrap();
        assert_eq!(&header[8..40], &source[8..40]);
        assert_eq!(LittleEndian::read_u32(&header[4..8]), 56);
        assert_eq!(LittleEndian::read_u32(&header[40..44]), 20);
    }
}
