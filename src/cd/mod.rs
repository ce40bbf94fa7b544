// src/cd/mod.rs
use binrw::prelude::*;
use std::fmt::Display;
use std::io::Cursor;

pub mod device;
pub mod error;
pub mod reader;
pub mod toc;

/// Size of one raw CD-DA sector as returned by a raw read.
pub const RAW_SECTOR_SIZE: usize = 2352;
/// Cooked sector size the drive uses to address raw reads (`DiskOffset = lba * 2048`).
pub const DISK_OFFSET_SIZE: u64 = 2048;
pub const FRAMES_PER_SECOND: u32 = 75;
pub const SECONDS_PER_MINUTE: u32 = 60;
/// Lead-in frames before the first addressable audio frame (00:02:00).
pub const LEAD_IN_FRAMES: u32 = 2 * FRAMES_PER_SECOND;

/// Track mode field of a raw read request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(repr = u32)]
pub enum TrackMode {
    YellowMode2 = 0,
    XaForm2 = 1,
    Cdda = 2,
}

/// Raw read request handed to the drive, one per sector.
/// Layout matches the 16-byte little-endian record drives expect.
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct RawReadInfo {
    pub disk_offset: i64,
    pub sector_count: u32,
    pub track_mode: TrackMode,
}

impl RawReadInfo {
    pub const SIZE: usize = 16;

    pub fn cdda(lba: u32) -> Self {
        Self {
            disk_offset: lba as i64 * DISK_OFFSET_SIZE as i64,
            sector_count: 1,
            track_mode: TrackMode::Cdda,
        }
    }

    /// Logical block address this request points at.
    pub fn lba(&self) -> u32 {
        (self.disk_offset / DISK_OFFSET_SIZE as i64) as u32
    }

    pub fn to_bytes(&self) -> BinResult<[u8; Self::SIZE]> {
        let mut buf = [0u8; Self::SIZE];
        self.write(&mut Cursor::new(&mut buf[..]))?;
        Ok(buf)
    }
}

/// Minute:Second:Frame disc address, 75 frames per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, BinRead, BinWrite)]
pub struct Msf {
    pub minutes: u8,
    pub seconds: u8,
    pub frames: u8,
}

impl Msf {
    pub fn is_zero(&self) -> bool {
        self.minutes == 0 && self.seconds == 0 && self.frames == 0
    }

    pub fn to_lba(&self) -> u32 {
        msf_to_lba(self.minutes, self.seconds, self.frames)
    }

    /// `None` when the minutes do not fit the one-byte field.
    pub fn from_lba(lba: u32) -> Option<Self> {
        Some(Self {
            minutes: u8::try_from(lba / FRAMES_PER_SECOND / SECONDS_PER_MINUTE).ok()?,
            seconds: (lba / FRAMES_PER_SECOND % SECONDS_PER_MINUTE) as u8,
            frames: (lba % FRAMES_PER_SECOND) as u8,
        })
    }
}

impl Display for Msf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.minutes, self.seconds, self.frames
        )
    }
}

/// `((M * 60) + S) * 75 + F`, no lead-in correction applied.
pub fn msf_to_lba(minutes: u8, seconds: u8, frames: u8) -> u32 {
    (minutes as u32 * SECONDS_PER_MINUTE + seconds as u32) * FRAMES_PER_SECOND + frames as u32
}
