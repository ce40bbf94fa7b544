use crate::cd::{FRAMES_PER_SECOND, SECONDS_PER_MINUTE};
use crate::cue::error::CueError;
use crate::wav::CD_FRAME_BYTES;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::str::FromStr;

/// Album-level document. Text fields are `None` when absent or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CueSheet {
    pub rem: BTreeMap<AlbumRemKey, String>,
    pub catalog: Option<String>,
    pub title: Option<String>,
    pub performer: Option<String>,
    pub files: Vec<CueFile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueFile {
    pub filename: String,
    pub file_type: FileType,
    /// Complete WAVE file contents, header included.
    pub data: Vec<u8>,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Track {
    pub number: u32,
    pub title: Option<String>,
    pub performer: Option<String>,
    pub rem: BTreeMap<TrackRemKey, String>,
    pub flags: BTreeSet<TrackFlag>,
    pub isrc: Option<String>,
    /// Pregap start, stored as written.
    pub index00: Option<String>,
    /// Track start, stored as written.
    pub index01: Option<String>,
}

impl Track {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Wave,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Wave => "WAVE",
        }
    }
}

/// Sub-code flags, ordered as they are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrackFlag {
    DigitalCopyPermitted,
    FourChannel,
    PreEmphasis,
    SerialCopyManagement,
}

impl TrackFlag {
    pub fn tag(&self) -> &'static str {
        match self {
            TrackFlag::DigitalCopyPermitted => "DCP",
            TrackFlag::FourChannel => "4CH",
            TrackFlag::PreEmphasis => "PRE",
            TrackFlag::SerialCopyManagement => "SCMS",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "DCP" => Some(TrackFlag::DigitalCopyPermitted),
            "4CH" => Some(TrackFlag::FourChannel),
            "PRE" => Some(TrackFlag::PreEmphasis),
            "SCMS" => Some(TrackFlag::SerialCopyManagement),
            _ => None,
        }
    }
}

/// A `REM <KEY> <value>` sub-key. Map order follows declaration order.
pub trait RemKey: Copy + Ord {
    fn tag(&self) -> &'static str;
    fn from_tag(tag: &str) -> Option<Self>;
    /// Whether the value is written wrapped in double quotes.
    fn quoted(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AlbumRemKey {
    Genre,
    Date,
    Publisher,
    Label,
    Producer,
    Production,
    Work,
    BgmWork,
    BgmDirector,
    Composer,
    /// Also read from `DISCNUMBER` and `TOTALDISCS`.
    DiscId,
    Jan,
    Comment,
}

impl RemKey for AlbumRemKey {
    fn tag(&self) -> &'static str {
        match self {
            AlbumRemKey::Genre => "GENRE",
            AlbumRemKey::Date => "DATE",
            AlbumRemKey::Publisher => "PUBLISHER",
            AlbumRemKey::Label => "LABEL",
            AlbumRemKey::Producer => "PRODUCER",
            AlbumRemKey::Production => "PRODUCTION",
            AlbumRemKey::Work => "WORK",
            AlbumRemKey::BgmWork => "BGM_WORK",
            AlbumRemKey::BgmDirector => "BGM_DIRECTOR",
            AlbumRemKey::Composer => "COMPOSER",
            AlbumRemKey::DiscId => "DISCID",
            AlbumRemKey::Jan => "JAN",
            AlbumRemKey::Comment => "COMMENT",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "GENRE" => Some(AlbumRemKey::Genre),
            "DATE" => Some(AlbumRemKey::Date),
            "PUBLISHER" => Some(AlbumRemKey::Publisher),
            "LABEL" => Some(AlbumRemKey::Label),
            "PRODUCER" => Some(AlbumRemKey::Producer),
            "PRODUCTION" => Some(AlbumRemKey::Production),
            "WORK" => Some(AlbumRemKey::Work),
            "BGM_WORK" => Some(AlbumRemKey::BgmWork),
            "BGM_DIRECTOR" => Some(AlbumRemKey::BgmDirector),
            "COMPOSER" => Some(AlbumRemKey::Composer),
            "DISCID" | "DISCNUMBER" | "TOTALDISCS" => Some(AlbumRemKey::DiscId),
            "JAN" => Some(AlbumRemKey::Jan),
            "COMMENT" => Some(AlbumRemKey::Comment),
            _ => None,
        }
    }

    fn quoted(&self) -> bool {
        !matches!(
            self,
            AlbumRemKey::Date | AlbumRemKey::DiscId | AlbumRemKey::Jan
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrackRemKey {
    Composer,
    Lyricist,
    Guitar,
    ElectricGuitar,
    Bass,
    ElectricBass,
    Keyboards,
    Synthesizer,
    AnalogSynthesizer,
    Horn,
    Drums,
    Percussions,
    Arranger,
    Remixer,
    Vocal,
    BackingVocal,
}

impl RemKey for TrackRemKey {
    fn tag(&self) -> &'static str {
        match self {
            TrackRemKey::Composer => "COMPOSER",
            TrackRemKey::Lyricist => "LYRICIST",
            TrackRemKey::Guitar => "GUITAR",
            TrackRemKey::ElectricGuitar => "ELECTRIC_GUITAR",
            TrackRemKey::Bass => "BASS",
            TrackRemKey::ElectricBass => "ELECTRIC_BASS",
            TrackRemKey::Keyboards => "KEYBOARDS",
            TrackRemKey::Synthesizer => "SYNTHESIZER",
            TrackRemKey::AnalogSynthesizer => "ANALOG_SYNTHESIZER",
            TrackRemKey::Horn => "HORN",
            TrackRemKey::Drums => "DRUMS",
            TrackRemKey::Percussions => "PERCUSSIONS",
            TrackRemKey::Arranger => "ARRANGER",
            TrackRemKey::Remixer => "REMIXER",
            TrackRemKey::Vocal => "VOCAL",
            TrackRemKey::BackingVocal => "BACKING_VOCAL",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "COMPOSER" => Some(TrackRemKey::Composer),
            "LYRICIST" => Some(TrackRemKey::Lyricist),
            "GUITAR" => Some(TrackRemKey::Guitar),
            "ELECTRIC_GUITAR" => Some(TrackRemKey::ElectricGuitar),
            "BASS" => Some(TrackRemKey::Bass),
            "ELECTRIC_BASS" => Some(TrackRemKey::ElectricBass),
            "KEYBOARDS" => Some(TrackRemKey::Keyboards),
            "SYNTHESIZER" => Some(TrackRemKey::Synthesizer),
            "ANALOG_SYNTHESIZER" => Some(TrackRemKey::AnalogSynthesizer),
            "HORN" => Some(TrackRemKey::Horn),
            "DRUMS" => Some(TrackRemKey::Drums),
            "PERCUSSIONS" => Some(TrackRemKey::Percussions),
            "ARRANGER" => Some(TrackRemKey::Arranger),
            "REMIXER" => Some(TrackRemKey::Remixer),
            "VOCAL" => Some(TrackRemKey::Vocal),
            "BACKING_VOCAL" => Some(TrackRemKey::BackingVocal),
            _ => None,
        }
    }

    fn quoted(&self) -> bool {
        true
    }
}

lazy_static! {
    static ref TIMECODE: Regex = Regex::new(r"^(\d{2,3}):(\d{2}):(\d{2})$").unwrap();
}

/// `MM:SS:FF` position inside a WAVE payload, 75 frames per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timecode {
    pub minutes: u32,
    pub seconds: u32,
    pub frames: u32,
}

impl Timecode {
    pub const ZERO: Timecode = Timecode {
        minutes: 0,
        seconds: 0,
        frames: 0,
    };

    pub fn total_frames(&self) -> u64 {
        (self.minutes as u64 * SECONDS_PER_MINUTE as u64 + self.seconds as u64)
            * FRAMES_PER_SECOND as u64
            + self.frames as u64
    }

    /// Offset of this position in the PCM payload.
    pub fn byte_offset(&self) -> u64 {
        self.total_frames() * CD_FRAME_BYTES as u64
    }
}

impl FromStr for Timecode {
    type Err = CueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CueError::InvalidTimecode(s.to_string());
        let caps = TIMECODE.captures(s).ok_or_else(invalid)?;

        let timecode = Timecode {
            minutes: caps[1].parse().map_err(|_| invalid())?,
            seconds: caps[2].parse().map_err(|_| invalid())?,
            frames: caps[3].parse().map_err(|_| invalid())?,
        };
        if timecode.seconds >= SECONDS_PER_MINUTE || timecode.frames >= FRAMES_PER_SECOND {
            return Err(invalid());
        }

        Ok(timecode)
    }
}

impl Display for Timecode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.minutes, self.seconds, self.frames
        )
    }
}
