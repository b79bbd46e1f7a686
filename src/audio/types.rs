//! Audio-related small types and handles.
//!
//! Commands sent to the audio thread, events it sends back and the playback
//! info it shares with the UI.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::coordinator::{Coordinator, PlayerSnapshot};

#[derive(Debug, PartialEq)]
pub enum AudioCmd {
    /// Reconcile the device with a new coordinator snapshot.
    Sync(PlayerSnapshot),
    /// Seek to an absolute position in the current source.
    Seek(Duration),
    /// Seek by the specified number of seconds (positive or negative).
    SeekBy(i64),
    /// Change output volume by a signed delta.
    ChangeVolume(f32),
    /// Toggle mute.
    ToggleMute,
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// Something the device did that the coordinator has to hear about.
///
/// `source` is the audio URL the event refers to, so a host can drop events
/// that arrive after the coordinator moved on to another track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingEvent {
    /// The source played to its natural end.
    Ended { source: Option<String> },
    /// Loading or starting the source failed; play intent must revert.
    PlaybackFailed {
        source: Option<String>,
        reason: String,
    },
}

impl BindingEvent {
    pub fn source(&self) -> Option<&str> {
        match self {
            BindingEvent::Ended { source } | BindingEvent::PlaybackFailed { source, .. } => {
                source.as_deref()
            }
        }
    }

    /// Feed this event into `coordinator`. Returns false when the event was stale.
    pub fn apply_to(&self, coordinator: &mut Coordinator) -> bool {
        let current = coordinator.current_track().and_then(|t| t.source());
        if current != self.source() {
            return false;
        }

        match self {
            BindingEvent::Ended { .. } => coordinator.handle_track_end(),
            BindingEvent::PlaybackFailed { .. } => coordinator.set_playing_state(false),
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Runtime playback information shared with the UI.
pub struct PlaybackInfo {
    /// Audio URL currently loaded on the device.
    pub source: Option<String>,
    /// Elapsed playback time for the current source.
    pub elapsed: Duration,
    /// Total length of the current source, when the decoder knows it.
    pub duration: Option<Duration>,
    /// Whether the device is currently producing output.
    pub playing: bool,
    pub volume: f32,
    pub muted: bool,
}

impl Default for PlaybackInfo {
    fn default() -> Self {
        Self {
            source: None,
            elapsed: Duration::ZERO,
            duration: None,
            playing: false,
            volume: 1.0,
            muted: false,
        }
    }
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;
