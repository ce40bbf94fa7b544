use crate::cd::toc::{POINT_FIRST_TRACK, POINT_LAST_TRACK, POINT_LEAD_OUT, TOC_DESCRIPTOR_SIZE};
use crate::cd::{LEAD_IN_FRAMES, Msf, RAW_SECTOR_SIZE, RawReadInfo, TrackMode};
use log::debug;
use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

/// The two primitives the ripping path needs from an already opened drive.
///
/// Opening, tray control and readiness polling stay with the caller; the
/// handle is released when the implementor is dropped.
pub trait CdDevice {
    /// Issues a full (raw) TOC query, filling `buffer` with as much of the
    /// response as fits. The first two big-endian bytes of the response hold
    /// the length of the data that follows them.
    fn read_toc(&mut self, buffer: &mut [u8]) -> io::Result<()>;

    /// Reads `info.sector_count` raw sectors into `buffer`.
    fn read_raw_sector(&mut self, info: &RawReadInfo, buffer: &mut [u8]) -> io::Result<()>;
}

impl<T: CdDevice + ?Sized> CdDevice for &mut T {
    fn read_toc(&mut self, buffer: &mut [u8]) -> io::Result<()> {
        (**self).read_toc(buffer)
    }

    fn read_raw_sector(&mut self, info: &RawReadInfo, buffer: &mut [u8]) -> io::Result<()> {
        (**self).read_raw_sector(info, buffer)
    }
}

/// A single-track audio disc backed by a raw 2352-byte-per-sector image.
#[derive(Debug)]
pub struct ImageDevice<R = File> {
    reader: BufReader<R>,
    sectors: u32,
    lead_out: Msf,
    /// Byte offset the reader is positioned at.
    position: u64,
}

impl ImageDevice<File> {
    pub fn open(image_path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::open(image_path)?;
        let len = file.metadata()?.len();
        Self::with_buffer(BufReader::with_capacity(8 * 1024 * 1024, file), len) // 8 MB buffer
    }
}

impl<R: Read + Seek> ImageDevice<R> {
    /// Wraps an image of `len` bytes positioned at its start.
    pub fn from_reader(inner: R, len: u64) -> io::Result<Self> {
        Self::with_buffer(BufReader::new(inner), len)
    }

    fn with_buffer(reader: BufReader<R>, len: u64) -> io::Result<Self> {
        if len % RAW_SECTOR_SIZE as u64 != 0 {
            return Err(io::Error::new(
                ErrorKind::InvalidData,
                format!("image size {len} is not a multiple of {RAW_SECTOR_SIZE}"),
            ));
        }

        let too_large = || {
            io::Error::new(
                ErrorKind::InvalidData,
                format!("image size {len} exceeds the addressable disc length"),
            )
        };
        let sectors = u32::try_from(len / RAW_SECTOR_SIZE as u64).map_err(|_| too_large())?;
        let lead_out = sectors
            .checked_add(LEAD_IN_FRAMES)
            .and_then(Msf::from_lba)
            .ok_or_else(too_large)?;
        debug!("Opened image with {} sectors, lead-out at {}", sectors, lead_out);

        Ok(Self {
            reader,
            sectors,
            lead_out,
            position: 0,
        })
    }

    pub fn sectors(&self) -> u32 {
        self.sectors
    }

    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    fn full_toc_response(&self) -> Vec<u8> {
        let first_track = Msf {
            minutes: 0,
            seconds: 2,
            frames: 0,
        };
        let descriptors = [
            (POINT_FIRST_TRACK, Msf { minutes: 1, seconds: 0, frames: 0 }),
            (POINT_LAST_TRACK, Msf { minutes: 1, seconds: 0, frames: 0 }),
            (POINT_LEAD_OUT, self.lead_out),
            (0x01, first_track),
        ];

        let length = (2 + descriptors.len() * TOC_DESCRIPTOR_SIZE) as u16;
        let mut response = Vec::with_capacity(length as usize + 2);
        response.extend_from_slice(&length.to_be_bytes());
        response.push(1); // first complete session
        response.push(1); // last complete session

        for (point, msf) in descriptors {
            // session, control/adr (audio, ADR 1), reserved, point
            response.extend_from_slice(&[1, 0x10, 0, point]);
            // extra MSF left zero so the primary field is used
            response.extend_from_slice(&[0, 0, 0, 0]);
            response.extend_from_slice(&[msf.minutes, msf.seconds, msf.frames]);
        }

        response
    }
}

impl<R: Read + Seek> CdDevice for ImageDevice<R> {
    fn read_toc(&mut self, buffer: &mut [u8]) -> io::Result<()> {
        let response = self.full_toc_response();
        let len = response.len().min(buffer.len());
        buffer[..len].copy_from_slice(&response[..len]);
        Ok(())
    }

    fn read_raw_sector(&mut self, info: &RawReadInfo, buffer: &mut [u8]) -> io::Result<()> {
        if info.track_mode != TrackMode::Cdda {
            return Err(io::Error::new(
                ErrorKind::Unsupported,
                format!("track mode {:?} is not supported", info.track_mode),
            ));
        }

        let lba = info.lba();
        if lba as u64 + info.sector_count as u64 > self.sectors as u64 {
            return Err(io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("LBA {lba} is past the end of the image"),
            ));
        }

        let len = info.sector_count as usize * RAW_SECTOR_SIZE;
        if buffer.len() < len {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                "sector buffer is too small",
            ));
        }

        // Seeking discards the read buffer, so sequential reads skip it
        let offset = lba as u64 * RAW_SECTOR_SIZE as u64;
        if offset != self.position {
            self.reader.seek(SeekFrom::Start(offset))?;
            self.position = offset;
        }
        let result = self.reader.read_exact(&mut buffer[..len]);
        self.position = match result {
            Ok(()) => offset + len as u64,
            // position is unknown after a short read
            Err(_) => u64::MAX,
        };

        result
    }
}
