use crate::cue::error::{CueError, CueResult};
use crate::cue::models::{CueFile, CueSheet, Timecode, Track};
use crate::wav::{WAV_HEADER_SIZE, derive_header};
use log::{debug, info};

impl CueSheet {
    /// Cuts every file into one WAVE file per track and returns the sheet
    /// describing them. `self` is left untouched.
    pub fn split_tracks(&self) -> CueResult<CueSheet> {
        let mut files = Vec::new();
        for file in &self.files {
            files.extend(split_file(file)?);
        }

        info!(
            "Split {} file(s) into {} track file(s)",
            self.files.len(),
            files.len()
        );

        Ok(CueSheet {
            rem: self.rem.clone(),
            catalog: self.catalog.clone(),
            title: self.title.clone(),
            performer: self.performer.clone(),
            files,
        })
    }
}

fn split_file(file: &CueFile) -> CueResult<Vec<CueFile>> {
    let mut split = Vec::with_capacity(file.tracks.len());

    for (i, track) in file.tracks.iter().enumerate() {
        let start = WAV_HEADER_SIZE as u64 + index01(track)?.byte_offset();
        let end = match file.tracks.get(i + 1) {
            Some(next) => {
                let boundary = match &next.index00 {
                    Some(index00) => index00.parse::<Timecode>()?,
                    None => index01(next)?,
                };
                WAV_HEADER_SIZE as u64 + boundary.byte_offset()
            }
            None => file.data.len() as u64,
        };

        let out_of_range = || CueError::SliceOutOfRange {
            file: file.filename.clone(),
            track: track.number,
            start,
            end,
            len: file.data.len(),
        };
        if start > end || end > file.data.len() as u64 {
            return Err(out_of_range());
        }
        let payload = usize::try_from(start)
            .ok()
            .zip(usize::try_from(end).ok())
            .map(|(start, end)| &file.data[start..end])
            .ok_or_else(out_of_range)?;

        let header = derive_header(&file.data, payload.len())?;
        let mut data = Vec::with_capacity(WAV_HEADER_SIZE + payload.len());
        data.extend_from_slice(&header);
        data.extend_from_slice(payload);

        let title = track.title.as_deref().unwrap_or_default();
        let filename = format!("{:02} {}.wav", track.number, sanitize_title(title));
        debug!(
            "Track {} spans bytes {}..{} of {}, writing {}",
            track.number, start, end, file.filename, filename
        );

        split.push(CueFile {
            filename,
            file_type: file.file_type,
            data,
            tracks: vec![Track {
                index00: None,
                index01: Some(Timecode::ZERO.to_string()),
                ..track.clone()
            }],
        });
    }

    Ok(split)
}

fn index01(track: &Track) -> CueResult<Timecode> {
    track
        .index01
        .as_deref()
        .ok_or(CueError::MissingIndex01(track.number))?
        .parse()
}

/// Replaces characters that cannot appear in a file name.
pub fn sanitize_title(title: &str) -> String {
    title.replace(['/', '"'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue::models::FileType;
    use crate::wav::{CD_FRAME_BYTES, WavHeader, assemble};

    const SECOND: usize = 75 * CD_FRAME_BYTES;

    fn track(number: u32, title: &str, index00: Option<&str>, index01: Option<&str>) -> Track {
        Track {
            title: Some(title.to_string()),
            index00: index00.map(str::to_string),
            index01: index01.map(str::to_string),
            ..Track::new(number)
        }
    }

    fn sheet(payload: Vec<u8>, tracks: Vec<Track>) -> CueSheet {
        CueSheet {
            title: Some("Album".to_string()),
            files: vec![CueFile {
                filename: "album.wav".to_string(),
                file_type: FileType::Wave,
                data: assemble(payload, 0).unwrap(),
                tracks,
            }],
            ..Default::default()
        }
    }

    fn assert_header(file: &CueFile) {
        let header = WavHeader::parse(&file.data).unwrap();
        let payload = (file.data.len() - WAV_HEADER_SIZE) as u32;
        assert_eq!(header.data_size, payload);
        assert_eq!(header.riff_size, payload + 36);
    }

    #[test]
    fn splits_at_index_01_boundaries() {
        let payload: Vec<u8> = (0..3 * SECOND).map(|i| (i % 251) as u8).collect();
        let source = sheet(
            payload.clone(),
            vec![
                track(1, "One", None, Some("00:00:00")),
                track(2, "Two", None, Some("00:03:00")),
            ],
        );

        let split = source.split_tracks().unwrap();

        assert_eq!(split.files.len(), 2);
        assert_eq!(split.files[0].data.len() - WAV_HEADER_SIZE, 3 * 75 * 2352);
        assert_eq!(&split.files[0].data[WAV_HEADER_SIZE..], &payload[..]);
        assert_eq!(split.files[1].data.len(), WAV_HEADER_SIZE);
        split.files.iter().for_each(assert_header);
    }

    #[test]
    fn last_track_takes_the_remainder() {
        let payload: Vec<u8> = (0..4 * SECOND + 100).map(|i| (i % 7) as u8).collect();
        let source = sheet(
            payload.clone(),
            vec![
                track(1, "One", None, Some("00:00:00")),
                track(2, "Two", None, Some("00:03:00")),
            ],
        );

        let split = source.split_tracks().unwrap();

        assert_eq!(&split.files[1].data[WAV_HEADER_SIZE..], &payload[3 * SECOND..]);
        assert_eq!(split.files[1].data.len() - WAV_HEADER_SIZE, SECOND + 100);
        split.files.iter().for_each(assert_header);
    }

    #[test]
    fn pregap_belongs_to_the_previous_track() {
        let source = sheet(
            vec![0; 3 * SECOND],
            vec![
                track(1, "One", None, Some("00:00:00")),
                track(2, "Two", Some("00:01:00"), Some("00:02:00")),
            ],
        );

        let split = source.split_tracks().unwrap();

        assert_eq!(split.files[0].data.len() - WAV_HEADER_SIZE, SECOND);
        assert_eq!(split.files[1].data.len() - WAV_HEADER_SIZE, SECOND);
    }

    #[test]
    fn new_files_are_named_and_normalized() {
        let mut first = track(1, "AC/DC \"Live\"", Some("00:00:00"), Some("00:00:10"));
        first.performer = Some("Band".to_string());
        let source = sheet(vec![0; SECOND], vec![first.clone()]);

        let split = source.split_tracks().unwrap();

        let file = &split.files[0];
        assert_eq!(file.filename, "01 AC_DC _Live_.wav");
        assert_eq!(file.tracks.len(), 1);
        let track = &file.tracks[0];
        assert_eq!(track.index00, None);
        assert_eq!(track.index01.as_deref(), Some("00:00:00"));
        assert_eq!(track.performer.as_deref(), Some("Band"));
        assert_eq!(split.title, source.title);
        // source sheet is unchanged
        assert_eq!(source.files[0].tracks[0], first);
        assert_eq!(source.files[0].filename, "album.wav");
    }

    #[test]
    fn missing_index_01_is_an_error() {
        let source = sheet(
            vec![0; SECOND],
            vec![
                track(1, "One", None, Some("00:00:00")),
                track(2, "Two", None, None),
            ],
        );
        assert!(matches!(
            source.split_tracks(),
            Err(CueError::MissingIndex01(2))
        ));
    }

    #[test]
    fn invalid_index_01_is_an_error() {
        let source = sheet(vec![0; SECOND], vec![track(1, "One", None, Some("0:00"))]);
        assert!(matches!(
            source.split_tracks(),
            Err(CueError::InvalidTimecode(tc)) if tc == "0:00"
        ));
    }

    #[test]
    fn index_past_the_payload_is_out_of_range() {
        let source = sheet(
            vec![0; SECOND],
            vec![
                track(1, "One", None, Some("00:00:00")),
                track(2, "Two", None, Some("00:05:00")),
            ],
        );
        assert!(matches!(
            source.split_tracks(),
            Err(CueError::SliceOutOfRange { track: 1, .. })
        ));
    }

    #[test]
    fn sanitizes_title() {
        assert_eq!(sanitize_title("a/b\"c"), "a_b_c");
        assert_eq!(sanitize_title("plain"), "plain");
    }
}
