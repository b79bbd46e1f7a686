//! The playback queue coordinator.
//!
//! Owns the queue, the cursor into it and the play intent. Every operation is
//! synchronous and total; the output binding reconciles the device with the
//! published state afterwards.

use std::sync::mpsc::{self, Receiver, Sender};

use log::trace;

use crate::library::Track;

/// Observable coordinator state, as delivered to subscribers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerSnapshot {
    pub current_index: Option<usize>,
    pub current_track: Option<Track>,
    pub queue_len: usize,
    pub is_playing: bool,
}

impl PlayerSnapshot {
    /// Audio URL of the current track, if any.
    pub fn source(&self) -> Option<&str> {
        self.current_track.as_ref().and_then(Track::source)
    }
}

/// Single source of truth for what is selected and whether it should play.
///
/// One instance is constructed per session by the runtime and handed by
/// reference to whoever needs it.
#[derive(Debug, Default)]
pub struct Coordinator {
    queue: Vec<Track>,
    current_index: Option<usize>,
    is_playing: bool,

    subscribers: Vec<Sender<PlayerSnapshot>>,
    last_published: PlayerSnapshot,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&self) -> &[Track] {
        &self.queue
    }

    /// Cursor into `queue()`; `None` exactly when nothing is selected.
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_index.and_then(|i| self.queue.get(i))
    }

    /// Play intent, not device state.
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            current_index: self.current_index,
            current_track: self.current_track().cloned(),
            queue_len: self.queue.len(),
            is_playing: self.is_playing,
        }
    }

    /// Receive a snapshot after every operation that changes observable state.
    pub fn subscribe(&mut self) -> Receiver<PlayerSnapshot> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Play `track`: jump to it when the queue already holds the same entry,
    /// otherwise replace the queue with just this track.
    pub fn play_track(&mut self, track: Track) {
        match self.queue.iter().position(|t| t.same_entry(&track)) {
            Some(pos) => self.current_index = Some(pos),
            None => {
                self.queue = vec![track];
                self.current_index = Some(0);
            }
        }
        self.is_playing = true;
        self.publish();
    }

    /// Replace queue and cursor in one step. `start_index` is clamped into the
    /// queue; an empty list clears everything.
    pub fn set_queue(&mut self, tracks: Vec<Track>, start_index: usize) {
        if tracks.is_empty() {
            self.queue.clear();
            self.current_index = None;
            self.is_playing = false;
        } else {
            let start = start_index.min(tracks.len() - 1);
            self.queue = tracks;
            self.current_index = Some(start);
            self.is_playing = true;
        }
        self.publish();
    }

    /// Flip the play intent. Callers disable this without a current track, but
    /// flipping with nothing selected is harmless.
    pub fn toggle_play(&mut self) {
        self.is_playing = !self.is_playing;
        self.publish();
    }

    pub fn pause(&mut self) {
        self.is_playing = false;
        self.publish();
    }

    /// Direct setter used by the output binding to report what the device did.
    pub fn set_playing_state(&mut self, playing: bool) {
        self.is_playing = playing;
        self.publish();
    }

    /// Advance one position. At the last position (or with an empty queue) the
    /// cursor stays put and playback stops; there is no wraparound.
    pub fn next_track(&mut self) {
        match self.current_index {
            Some(i) if i + 1 < self.queue.len() => {
                self.current_index = Some(i + 1);
                self.is_playing = true;
            }
            _ => self.is_playing = false,
        }
        self.publish();
    }

    /// Step back one position; at the first position keep the cursor and play.
    pub fn prev_track(&mut self) {
        match self.current_index {
            Some(i) if i > 0 => {
                self.current_index = Some(i - 1);
                self.is_playing = true;
            }
            Some(_) => self.is_playing = true,
            None => {}
        }
        self.publish();
    }

    /// Natural end of the current track: auto-advance.
    pub fn handle_track_end(&mut self) {
        self.next_track();
    }

    fn publish(&mut self) {
        let snapshot = self.snapshot();
        if snapshot == self.last_published {
            return;
        }

        trace!(
            "player state: index={:?} playing={} queue={}",
            snapshot.current_index, snapshot.is_playing, snapshot.queue_len
        );
        self.subscribers.retain(|tx| tx.send(snapshot.clone()).is_ok());
        self.last_published = snapshot;
    }
}
