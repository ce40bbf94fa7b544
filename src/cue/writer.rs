use crate::cue::models::{CueSheet, RemKey, Track};
use std::collections::BTreeMap;
use std::fmt::Write;

const TRACK_INDENT: &str = "  ";
const FIELD_INDENT: &str = "    ";

/// Renders the sheet as CUE text. Absent fields are skipped, everything else
/// is written in a fixed order so equal sheets produce equal text.
pub fn serialize(sheet: &CueSheet) -> String {
    let mut out = String::new();

    write_rem(&mut out, "", &sheet.rem);
    if let Some(catalog) = &sheet.catalog {
        line(&mut out, "", format_args!("CATALOG {catalog}"));
    }
    if let Some(title) = &sheet.title {
        line(&mut out, "", format_args!("TITLE \"{}\"", encode_title(title)));
    }
    if let Some(performer) = &sheet.performer {
        line(&mut out, "", format_args!("PERFORMER \"{performer}\""));
    }

    for file in &sheet.files {
        line(
            &mut out,
            "",
            format_args!("FILE \"{}\" {}", file.filename, file.file_type.as_str()),
        );
        for track in &file.tracks {
            write_track(&mut out, track);
        }
    }

    out
}

fn write_track(out: &mut String, track: &Track) {
    line(out, TRACK_INDENT, format_args!("TRACK {:02} AUDIO", track.number));

    if let Some(isrc) = &track.isrc {
        // parsing strips exactly one pair of quotes
        line(out, FIELD_INDENT, format_args!("ISRC \"{isrc}\""));
    }
    if let Some(title) = &track.title {
        line(out, FIELD_INDENT, format_args!("TITLE \"{}\"", encode_title(title)));
    }
    if let Some(performer) = &track.performer {
        line(out, FIELD_INDENT, format_args!("PERFORMER \"{performer}\""));
    }
    write_rem(out, FIELD_INDENT, &track.rem);
    if !track.flags.is_empty() {
        let flags: Vec<_> = track.flags.iter().map(|flag| flag.tag()).collect();
        line(out, FIELD_INDENT, format_args!("FLAGS {}", flags.join(" ")));
    }
    if let Some(index) = &track.index00 {
        line(out, FIELD_INDENT, format_args!("INDEX 00 {index}"));
    }
    if let Some(index) = &track.index01 {
        line(out, FIELD_INDENT, format_args!("INDEX 01 {index}"));
    }
}

fn write_rem<K: RemKey>(out: &mut String, indent: &str, rem: &BTreeMap<K, String>) {
    for (key, value) in rem {
        if key.quoted() {
            line(out, indent, format_args!("REM {} \"{value}\"", key.tag()));
        } else {
            line(out, indent, format_args!("REM {} {value}", key.tag()));
        }
    }
}

fn line(out: &mut String, indent: &str, args: std::fmt::Arguments<'_>) {
    // Writing into a String cannot fail
    let _ = writeln!(out, "{indent}{args}");
}

fn encode_title(title: &str) -> String {
    title.replace('"', "\"\"")
}
