use crate::commands::ensure_writable;
use crate::error::CddaCueResult;
use cdda_cue::cd::device::ImageDevice;
use cdda_cue::cd::reader::{RipOptions, RipProgress, Ripper};
use clap::Parser;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::info;
use std::path::PathBuf;
use tokio::fs;

/// Rips a raw CD-DA image (2352 bytes per sector) into a single WAVE file.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
pub struct RipCommand {
    /// Raw image standing in for the drive
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// Output wav file path
    #[arg(value_name = "OUTPUT", default_value = "file.wav")]
    pub output: PathBuf,

    /// Number of full rereads compared against the first read
    #[arg(long, short = 'v', value_name = "COUNT", default_value_t = 0)]
    pub verify: u32,

    /// Drive read offset correction in samples
    #[arg(long, short = 'o', value_name = "SAMPLES", default_value_t = 0, allow_negative_numbers = true)]
    pub offset: i32,

    /// Force overwrite of the output file if it already exists
    #[arg(long, short = 'f', value_name = "FORCE", default_value_t = false)]
    pub force: bool,
}

pub async fn rip(cmd: RipCommand, multi: MultiProgress) -> CddaCueResult<()> {
    ensure_writable(&cmd.output, cmd.force).await?;

    let bar = multi.add(ProgressBar::new(0));
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len} sectors ({eta})")?
            .progress_chars("=> "),
    );

    let options = RipOptions {
        verify_count: cmd.verify,
        sample_offset: cmd.offset,
    };
    let image = cmd.image.clone();
    let pass_bar = bar.clone();

    let result = tokio::task::spawn_blocking(move || -> CddaCueResult<Vec<u8>> {
        let device = ImageDevice::open(&image)?;
        let mut ripper = Ripper::new(device, options);
        Ok(ripper.rip(|progress| update_bar(&pass_bar, progress))?)
    })
    .await;
    bar.finish_and_clear();
    let wav = result??;

    fs::write(&cmd.output, &wav).await?;
    info!("Wrote {} ({} bytes)", cmd.output.display(), wav.len());

    Ok(())
}

fn update_bar(bar: &ProgressBar, progress: RipProgress) {
    if progress.sectors_read == 1 {
        bar.set_length(progress.total_sectors as u64);
        bar.reset();
        let label = if progress.pass == 0 { "Reading" } else { "Verifying" };
        bar.set_message(format!(
            "{} (pass {}/{})",
            label,
            progress.pass + 1,
            progress.total_passes
        ));
    }
    bar.set_position(progress.sectors_read as u64);
}
