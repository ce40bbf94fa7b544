use crate::cue::error::{CueError, CueResult};
use crate::cue::models::{
    AlbumRemKey, CueFile, CueSheet, FileType, RemKey, Track, TrackFlag, TrackRemKey,
};
use crate::wav::validate_header;
use log::{debug, warn};
use std::collections::BTreeMap;

/// Which group of tags the current line may use. The first FILE line moves
/// the parser from album fields to track fields for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Album,
    Track,
}

struct SheetBuilder<'a, F> {
    sheet: CueSheet,
    state: ParseState,
    /// `(file, track)` position of the most recent TRACK line.
    current_track: Option<(usize, usize)>,
    load_wave: &'a mut F,
}

/// Parses CUE sheet text. `load_wave` is called with the file name of every
/// `FILE` line and must return the complete WAVE file.
pub fn parse_cue<F>(text: &str, mut load_wave: F) -> CueResult<CueSheet>
where
    F: FnMut(&str) -> CueResult<Vec<u8>>,
{
    let mut builder = SheetBuilder {
        sheet: CueSheet::default(),
        state: ParseState::Album,
        current_track: None,
        load_wave: &mut load_wave,
    };

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        builder.line(line)?;
    }

    debug!(
        "Parsed CUE sheet with {} file(s) and {} track(s)",
        builder.sheet.files.len(),
        builder
            .sheet
            .files
            .iter()
            .map(|f| f.tracks.len())
            .sum::<usize>()
    );

    Ok(builder.sheet)
}

impl<F> SheetBuilder<'_, F>
where
    F: FnMut(&str) -> CueResult<Vec<u8>>,
{
    fn line(&mut self, line: &str) -> CueResult<()> {
        let (tag, value) = line
            .split_once(' ')
            .ok_or_else(|| invalid_line(line))?;

        // FILE may appear in either state, some rips declare one per track
        if tag == "FILE" {
            self.file(line, value)?;
            self.state = ParseState::Track;
            return Ok(());
        }

        match self.state {
            ParseState::Album => self.album_field(line, tag, value),
            ParseState::Track => self.track_field(line, tag, value),
        }
    }

    fn file(&mut self, line: &str, value: &str) -> CueResult<()> {
        let filename = value
            .strip_suffix(" WAVE")
            .map(trim_quotes)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| invalid_line(line))?;

        let data = (*self.load_wave)(filename)?;
        validate_header(&data).map_err(|source| CueError::InvalidWave {
            file: filename.to_string(),
            source,
        })?;

        self.sheet.files.push(CueFile {
            filename: filename.to_string(),
            file_type: FileType::Wave,
            data,
            tracks: Vec::new(),
        });

        Ok(())
    }

    fn album_field(&mut self, line: &str, tag: &str, value: &str) -> CueResult<()> {
        match tag {
            "REM" => insert_rem::<AlbumRemKey>(&mut self.sheet.rem, line, value)?,
            "CATALOG" => self.sheet.catalog = non_empty(value),
            "TITLE" => self.sheet.title = non_empty(&decode_title(value)),
            "PERFORMER" => self.sheet.performer = non_empty(trim_quotes(value)),
            _ => return Err(invalid_line(line)),
        }

        Ok(())
    }

    fn track_field(&mut self, line: &str, tag: &str, value: &str) -> CueResult<()> {
        if tag == "TRACK" {
            return self.track(line, value);
        }

        let track = self.current_track(line)?;
        match tag {
            "ISRC" => track.isrc = non_empty(trim_quotes(value)),
            "TITLE" => track.title = non_empty(&decode_title(value)),
            "PERFORMER" => track.performer = non_empty(trim_quotes(value)),
            "REM" => insert_rem::<TrackRemKey>(&mut track.rem, line, value)?,
            "FLAGS" => {
                for flag in trim_quotes(value).split(' ').filter(|f| !f.is_empty()) {
                    match TrackFlag::from_tag(flag) {
                        Some(flag) => {
                            track.flags.insert(flag);
                        }
                        None => warn!("Ignoring unknown flag {} of track {}", flag, track.number),
                    }
                }
            }
            "INDEX" => match value.split_once(' ') {
                Some(("00", timecode)) => track.index00 = non_empty(timecode.trim()),
                Some(("01", timecode)) => track.index01 = non_empty(timecode.trim()),
                _ => return Err(invalid_line(line)),
            },
            _ => return Err(invalid_line(line)),
        }

        Ok(())
    }

    fn track(&mut self, line: &str, value: &str) -> CueResult<()> {
        let number = value
            .strip_suffix(" AUDIO")
            .and_then(|n| n.trim().parse::<u32>().ok())
            .ok_or_else(|| invalid_line(line))?;

        let file_index = self.sheet.files.len().saturating_sub(1);
        let file = self
            .sheet
            .files
            .get_mut(file_index)
            .ok_or_else(|| invalid_line(line))?;
        file.tracks.push(Track::new(number));
        self.current_track = Some((file_index, file.tracks.len() - 1));

        Ok(())
    }

    /// Track tags apply to the latest TRACK, even across a FILE line.
    fn current_track(&mut self, line: &str) -> CueResult<&mut Track> {
        let (file, track) = self.current_track.ok_or_else(|| invalid_line(line))?;
        Ok(&mut self.sheet.files[file].tracks[track])
    }
}

fn insert_rem<K: RemKey>(rem: &mut BTreeMap<K, String>, line: &str, value: &str) -> CueResult<()> {
    let (key, value) = value.split_once(' ').ok_or_else(|| invalid_line(line))?;
    let key = K::from_tag(key).ok_or_else(|| invalid_line(line))?;
    let value = if key.quoted() { trim_quotes(value) } else { value };

    match non_empty(value) {
        Some(value) => {
            rem.insert(key, value);
        }
        None => {
            rem.remove(&key);
        }
    }

    Ok(())
}

fn invalid_line(line: &str) -> CueError {
    CueError::InvalidLine(line.to_string())
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Strips one pair of wrapping double quotes.
pub(crate) fn trim_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Titles additionally use `""` for a literal quote.
fn decode_title(value: &str) -> String {
    trim_quotes(value).replace("\"\"", "\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wav::assemble;
    use std::collections::HashMap;

    fn wave(payload_len: usize) -> Vec<u8> {
        assemble(vec![0; payload_len], 0).unwrap()
    }

    fn parse(text: &str) -> CueResult<CueSheet> {
        parse_cue(text, |_| Ok(wave(16)))
    }

    const SAMPLE: &str = r#"REM GENRE "Soundtrack"
REM DATE 2021
REM DISCNUMBER 1
REM COMMENT "ExactAudioCopy v1.6"
CATALOG 4988001234567
TITLE "The ""Best"" Of"
PERFORMER "Various Artists"
FILE "Disc 1.wav" WAVE
  TRACK 01 AUDIO
    TITLE "Opening"
    PERFORMER "Composer A"
    REM COMPOSER "Composer A"
    REM BACKING_VOCAL "Singer B"
    FLAGS DCP PRE
    ISRC JPK631234567
    INDEX 01 00:00:00
  TRACK 02 AUDIO
    TITLE "Theme"
    INDEX 00 02:58:10
    INDEX 01 03:00:00
"#;

    #[test]
    fn parses_album_and_track_fields() {
        let sheet = parse(SAMPLE).unwrap();

        assert_eq!(sheet.rem[&AlbumRemKey::Genre], "Soundtrack");
        assert_eq!(sheet.rem[&AlbumRemKey::Date], "2021");
        assert_eq!(sheet.rem[&AlbumRemKey::DiscId], "1");
        assert_eq!(sheet.rem[&AlbumRemKey::Comment], "ExactAudioCopy v1.6");
        assert_eq!(sheet.catalog.as_deref(), Some("4988001234567"));
        assert_eq!(sheet.title.as_deref(), Some("The \"Best\" Of"));
        assert_eq!(sheet.performer.as_deref(), Some("Various Artists"));

        assert_eq!(sheet.files.len(), 1);
        let file = &sheet.files[0];
        assert_eq!(file.filename, "Disc 1.wav");
        assert_eq!(file.file_type, FileType::Wave);
        assert_eq!(file.data.len(), 44 + 16);
        assert_eq!(file.tracks.len(), 2);

        let first = &file.tracks[0];
        assert_eq!(first.number, 1);
        assert_eq!(first.title.as_deref(), Some("Opening"));
        assert_eq!(first.rem[&TrackRemKey::Composer], "Composer A");
        assert_eq!(first.rem[&TrackRemKey::BackingVocal], "Singer B");
        assert!(first.flags.contains(&TrackFlag::DigitalCopyPermitted));
        assert!(first.flags.contains(&TrackFlag::PreEmphasis));
        assert_eq!(first.flags.len(), 2);
        assert_eq!(first.isrc.as_deref(), Some("JPK631234567"));
        assert_eq!(first.index00, None);
        assert_eq!(first.index01.as_deref(), Some("00:00:00"));

        let second = &file.tracks[1];
        assert_eq!(second.index00.as_deref(), Some("02:58:10"));
        assert_eq!(second.index01.as_deref(), Some("03:00:00"));
    }

    #[test]
    fn unknown_track_tag_names_the_line() {
        let text = "FILE \"a.wav\" WAVE\n  TRACK 01 AUDIO\n    BOGUS value\n";
        match parse(text) {
            Err(CueError::InvalidLine(line)) => assert_eq!(line, "BOGUS value"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn unknown_album_rem_is_rejected() {
        assert!(matches!(
            parse("REM MOOD \"calm\"\n"),
            Err(CueError::InvalidLine(line)) if line == "REM MOOD \"calm\""
        ));
    }

    #[test]
    fn track_rem_keys_are_not_album_keys() {
        let text = "FILE \"a.wav\" WAVE\n  TRACK 01 AUDIO\n    REM GENRE \"Rock\"\n";
        assert!(matches!(parse(text), Err(CueError::InvalidLine(_))));
    }

    #[test]
    fn track_before_file_is_rejected() {
        assert!(matches!(
            parse("TRACK 01 AUDIO\n"),
            Err(CueError::InvalidLine(_))
        ));
    }

    #[test]
    fn only_wave_files_and_audio_tracks_are_supported() {
        assert!(matches!(
            parse("FILE \"a.bin\" BINARY\n"),
            Err(CueError::InvalidLine(_))
        ));
        assert!(matches!(
            parse("FILE \"a.wav\" WAVE\nTRACK 01 MODE1/2352\n"),
            Err(CueError::InvalidLine(_))
        ));
        assert!(matches!(
            parse("FILE \"a.wav\" WAVE\nTRACK xx AUDIO\n"),
            Err(CueError::InvalidLine(_))
        ));
    }

    #[test]
    fn only_index_00_and_01_are_supported() {
        let text = "FILE \"a.wav\" WAVE\n  TRACK 01 AUDIO\n    INDEX 02 00:00:00\n";
        assert!(matches!(parse(text), Err(CueError::InvalidLine(_))));
    }

    #[test]
    fn track_tag_before_any_track_is_rejected() {
        let text = "FILE \"a.wav\" WAVE\n    TITLE \"x\"\n";
        assert!(matches!(parse(text), Err(CueError::InvalidLine(_))));
    }

    #[test]
    fn file_names_may_contain_spaces_and_appear_per_track() {
        let mut waves = HashMap::new();
        waves.insert("01 Intro.wav", wave(8));
        waves.insert("02 Outro.wav", wave(4));
        let text = r#"TITLE "Album"
FILE "01 Intro.wav" WAVE
  TRACK 01 AUDIO
    INDEX 01 00:00:00
  TRACK 02 AUDIO
    INDEX 00 00:00:30
FILE "02 Outro.wav" WAVE
    INDEX 01 00:00:00
"#;
        let mut requested = Vec::new();
        let sheet = parse_cue(text, |name| {
            requested.push(name.to_string());
            Ok(waves[name].clone())
        })
        .unwrap();

        assert_eq!(requested, vec!["01 Intro.wav", "02 Outro.wav"]);
        assert_eq!(sheet.files.len(), 2);
        assert_eq!(sheet.files[0].tracks.len(), 2);
        assert!(sheet.files[1].tracks.is_empty());
        // INDEX 01 after the second FILE line still belongs to track 2
        let second = &sheet.files[0].tracks[1];
        assert_eq!(second.index00.as_deref(), Some("00:00:30"));
        assert_eq!(second.index01.as_deref(), Some("00:00:00"));
    }

    #[test]
    fn unquoted_file_names_are_accepted() {
        let sheet = parse("FILE image.wav WAVE\n").unwrap();
        assert_eq!(sheet.files[0].filename, "image.wav");
    }

    #[test]
    fn invalid_wave_is_a_format_error() {
        let result = parse_cue("FILE \"a.wav\" WAVE\n", |_| {
            let mut data = wave(4);
            data[22] = 1; // mono
            Ok(data)
        });
        match result {
            Err(CueError::InvalidWave { file, .. }) => assert_eq!(file, "a.wav"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn crlf_indentation_and_blank_lines_are_tolerated() {
        let text = "REM DATE 1999\r\n\r\n   \r\nTITLE \"X\"\r\nFILE \"a.wav\" WAVE\r\n\tTRACK 01 AUDIO\r\n";
        let sheet = parse(text).unwrap();
        assert_eq!(sheet.rem[&AlbumRemKey::Date], "1999");
        assert_eq!(sheet.title.as_deref(), Some("X"));
        assert_eq!(sheet.files[0].tracks[0].number, 1);
    }

    #[test]
    fn quotes_are_only_stripped_when_wrapping() {
        assert_eq!(trim_quotes("\"a\""), "a");
        assert_eq!(trim_quotes("\"a"), "\"a");
        assert_eq!(trim_quotes("a\""), "a\"");
        assert_eq!(trim_quotes("\""), "\"");
        assert_eq!(trim_quotes("\"\""), "");
    }

    #[test]
    fn doubled_quotes_are_decoded_only_in_titles() {
        let text = "PERFORMER \"A \"\"B\"\"\"\nTITLE \"A \"\"B\"\"\"\n";
        let sheet = parse(text).unwrap();
        assert_eq!(sheet.performer.as_deref(), Some("A \"\"B\"\""));
        assert_eq!(sheet.title.as_deref(), Some("A \"B\""));
    }

    #[test]
    fn flags_ignore_unknown_entries() {
        let text = "FILE \"a.wav\" WAVE\n  TRACK 01 AUDIO\n    FLAGS 4CH  SCMS DATA\n";
        let sheet = parse(text).unwrap();
        let flags: Vec<_> = sheet.files[0].tracks[0].flags.iter().copied().collect();
        assert_eq!(flags, vec![TrackFlag::FourChannel, TrackFlag::SerialCopyManagement]);
    }
}
