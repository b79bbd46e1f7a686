use std::time::Duration;

use super::model::Track;

/// `m:ss` for track lengths; `-` when the length is unknown or zero.
pub fn format_duration(d: Option<Duration>) -> String {
    match d {
        Some(d) if !d.is_zero() => format_clock(d),
        _ => "-".to_string(),
    }
}

/// `m:ss` for a playback position. Minutes are not capped at 59.
pub fn format_clock(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// `Artist - Title`, or just the title when the artist is blank.
pub fn display_line(track: &Track) -> String {
    let title = track.title.trim();
    match track.artist.trim() {
        "" => title.to_string(),
        artist => format!("{artist} - {title}"),
    }
}
