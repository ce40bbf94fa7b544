use crate::cd::Msf;
use crate::cd::device::CdDevice;
use crate::cd::error::{CdError, CdResult};
use binrw::{BinRead, BinWrite};
use byteorder::{BigEndian, ByteOrder};
use log::debug;
use std::io::Cursor;

pub const TOC_HEADER_SIZE: usize = 4;
pub const TOC_DESCRIPTOR_SIZE: usize = 11;
const INITIAL_TOC_BUFFER_SIZE: usize = 2048;

pub const POINT_FIRST_TRACK: u8 = 0xA0;
pub const POINT_LAST_TRACK: u8 = 0xA1;
pub const POINT_LEAD_OUT: u8 = 0xA2;
pub const POINT_TRACK_01: u8 = 0x01;

const CONTROL_PRE_EMPHASIS: u8 = 0x1;
const CONTROL_DIGITAL_COPY_PERMITTED: u8 = 0x2;
const CONTROL_DATA_TRACK: u8 = 0x4;
const CONTROL_FOUR_CHANNEL: u8 = 0x8;

/// One 11-byte full TOC descriptor.
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(big)]
pub struct TocDescriptor {
    pub session_number: u8,
    /// ADR in the high nibble, control in the low nibble.
    pub control_adr: u8,
    pub reserved: u8,
    pub point: u8,
    pub msf_extra: Msf,
    pub zero: u8,
    pub msf: Msf,
}

impl TocDescriptor {
    pub fn adr(&self) -> u8 {
        self.control_adr >> 4
    }

    pub fn control(&self) -> u8 {
        self.control_adr & 0x0F
    }

    pub fn has_pre_emphasis(&self) -> bool {
        self.control() & CONTROL_PRE_EMPHASIS != 0
    }

    pub fn digital_copy_permitted(&self) -> bool {
        self.control() & CONTROL_DIGITAL_COPY_PERMITTED != 0
    }

    pub fn is_data_track(&self) -> bool {
        self.control() & CONTROL_DATA_TRACK != 0
    }

    pub fn is_four_channel(&self) -> bool {
        self.control() & CONTROL_FOUR_CHANNEL != 0
    }

    /// Drives fill either the extra or the primary MSF depending on the
    /// addressing mode; the extra field wins whenever it is non-zero.
    pub fn lba(&self) -> u32 {
        if self.msf_extra.is_zero() {
            self.msf.to_lba()
        } else {
            self.msf_extra.to_lba()
        }
    }
}

/// Parsed full TOC response.
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(big)]
pub struct FullToc {
    /// Length of the response excluding these two bytes.
    pub length: u16,
    pub first_complete_session: u8,
    pub last_complete_session: u8,
    #[br(count = (length.saturating_sub(2) as usize) / TOC_DESCRIPTOR_SIZE)]
    pub descriptors: Vec<TocDescriptor>,
}

impl FullToc {
    pub fn descriptor(&self, point: u8) -> CdResult<&TocDescriptor> {
        self.descriptors
            .iter()
            .find(|d| d.point == point)
            .ok_or(CdError::TocPointNotFound(point))
    }

    pub fn track01_lba(&self) -> CdResult<u32> {
        Ok(self.descriptor(POINT_TRACK_01)?.lba())
    }

    pub fn lead_out_lba(&self) -> CdResult<u32> {
        Ok(self.descriptor(POINT_LEAD_OUT)?.lba())
    }

    /// Number of sectors between the first audio track and the lead-out.
    pub fn capture_length(&self) -> CdResult<u32> {
        let first_track = self.track01_lba()?;
        let lead_out = self.lead_out_lba()?;
        lead_out
            .checked_sub(first_track)
            .ok_or(CdError::InvalidCaptureRange {
                first_track,
                lead_out,
            })
    }
}

/// Queries the full TOC, growing the buffer once the drive reports a
/// response longer than what was offered.
pub fn read_toc<D: CdDevice>(device: &mut D) -> CdResult<FullToc> {
    let mut buffer = vec![0u8; INITIAL_TOC_BUFFER_SIZE];

    loop {
        device
            .read_toc(&mut buffer)
            .map_err(|source| CdError::DeviceControl {
                operation: "read TOC",
                source,
            })?;

        let length = BigEndian::read_u16(&buffer[0..2]) as usize + 2;
        if buffer.len() < length {
            debug!(
                "TOC response is {} bytes, retrying with a larger buffer",
                length
            );
            buffer = vec![0u8; length];
            continue;
        }

        if length < TOC_HEADER_SIZE {
            return Err(CdError::TocTooShort(length));
        }

        let toc = FullToc::read(&mut Cursor::new(&buffer[..length]))?;
        debug!(
            "Read TOC with {} descriptors (sessions {}-{})",
            toc.descriptors.len(),
            toc.first_complete_session,
            toc.last_complete_session
        );

        return Ok(toc);
    }
}
