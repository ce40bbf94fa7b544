use crate::cd::device::CdDevice;
use crate::cd::error::{CdError, CdResult};
use crate::cd::toc::read_toc;
use crate::cd::{RAW_SECTOR_SIZE, RawReadInfo};
use crate::wav;
use log::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RipOptions {
    /// Additional full rereads compared byte-for-byte against the first one.
    pub verify_count: u32,
    /// Drive read offset correction in samples (one sample = 4 bytes).
    pub sample_offset: i32,
}

/// Progress of one acquisition pass. Pass 0 is the initial read, passes
/// `1..=total_passes - 1` are verification rereads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RipProgress {
    pub pass: u32,
    pub total_passes: u32,
    pub sectors_read: u32,
    pub total_sectors: u32,
}

/// Reads LBAs `0..end_lba` one raw sector at a time.
///
/// The first sector that fails aborts the capture and nothing read so far is
/// returned.
pub fn read_all_sectors<D, F>(device: &mut D, end_lba: u32, mut on_sector: F) -> CdResult<Vec<u8>>
where
    D: CdDevice,
    F: FnMut(u32),
{
    let mut data = Vec::with_capacity(end_lba as usize * RAW_SECTOR_SIZE);
    let mut sector = [0u8; RAW_SECTOR_SIZE];

    for lba in 0..end_lba {
        let request = RawReadInfo::cdda(lba);
        device
            .read_raw_sector(&request, &mut sector)
            .map_err(|source| CdError::DeviceIo {
                operation: "raw read",
                lba,
                source,
            })?;
        data.extend_from_slice(&sector);
        on_sector(lba + 1);
    }

    Ok(data)
}

/// Compares a verification pass against the first capture.
pub fn compare_capture(pass: u32, first: &[u8], reread: &[u8]) -> CdResult<()> {
    match first.iter().zip(reread).position(|(a, b)| a != b) {
        Some(first_difference) => Err(CdError::VerificationMismatch {
            pass,
            first_difference,
        }),
        None if first.len() != reread.len() => Err(CdError::VerificationMismatch {
            pass,
            first_difference: first.len().min(reread.len()),
        }),
        None => Ok(()),
    }
}

/// TOC → sectors → verification → WAV assembly for one device.
pub struct Ripper<D: CdDevice> {
    device: D,
    options: RipOptions,
}

impl<D: CdDevice> Ripper<D> {
    pub fn new(device: D, options: RipOptions) -> Self {
        Self { device, options }
    }

    /// Reads the whole disc and verifies it, returning the raw PCM capture.
    pub fn capture<F>(&mut self, mut progress: F) -> CdResult<Vec<u8>>
    where
        F: FnMut(RipProgress),
    {
        let toc = read_toc(&mut self.device)?;
        let end_lba = toc.capture_length()?;
        let total_passes = self.options.verify_count + 1;
        info!(
            "Capturing {} sectors ({} bytes), {} verification pass(es)",
            end_lba,
            end_lba as usize * RAW_SECTOR_SIZE,
            self.options.verify_count
        );

        let first = self.read_pass(0, total_passes, end_lba, &mut progress)?;

        for pass in 1..total_passes {
            let reread = self.read_pass(pass, total_passes, end_lba, &mut progress)?;
            compare_capture(pass, &first, &reread)?;
            debug!("Verification pass {} matches", pass);
        }

        Ok(first)
    }

    /// Captures the disc and wraps the PCM in a WAV container, applying the
    /// configured sample offset.
    pub fn rip<F>(&mut self, progress: F) -> CdResult<Vec<u8>>
    where
        F: FnMut(RipProgress),
    {
        let pcm = self.capture(progress)?;
        Ok(wav::assemble(pcm, self.options.sample_offset)?)
    }

    pub fn into_device(self) -> D {
        self.device
    }

    fn read_pass<F>(
        &mut self,
        pass: u32,
        total_passes: u32,
        end_lba: u32,
        progress: &mut F,
    ) -> CdResult<Vec<u8>>
    where
        F: FnMut(RipProgress),
    {
        read_all_sectors(&mut self.device, end_lba, |sectors_read| {
            progress(RipProgress {
                pass,
                total_passes,
                sectors_read,
                total_sectors: end_lba,
            })
        })
    }
}
