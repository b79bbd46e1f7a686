//! The audio output binding.
//!
//! Mirrors coordinator snapshots onto an `AudioDevice` and turns device
//! outcomes (natural end, load or play failure) into `BindingEvent`s for the
//! host to feed back into the coordinator.

use std::thread;
use std::time::Duration;

use log::{debug, warn};

use super::coordinator::PlayerSnapshot;
use super::device::AudioDevice;
use super::types::BindingEvent;
use super::volume::{VolumeState, VolumeStore};

/// What the device currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Loaded {
    Nothing,
    Ready(String),
    /// The current track could not be loaded; remembered so the same source is
    /// not retried until the track changes.
    Broken {
        source: Option<String>,
        reason: String,
    },
}

pub struct AudioBinding<D: AudioDevice> {
    device: D,
    loaded: Loaded,
    device_playing: bool,
    end_reported: bool,
    volume: VolumeState,
    volume_store: VolumeStore,
}

impl<D: AudioDevice> AudioBinding<D> {
    /// Wrap `device`, restoring the persisted volume onto it.
    pub fn new(mut device: D, volume_store: VolumeStore) -> Self {
        let volume = volume_store.load();
        device.set_volume(volume.effective());
        Self {
            device,
            loaded: Loaded::Nothing,
            device_playing: false,
            end_reported: false,
            volume,
            volume_store,
        }
    }

    #[cfg(test)]
    pub(crate) fn device(&self) -> &D {
        &self.device
    }

    #[cfg(test)]
    pub(crate) fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Audio URL currently on the device.
    pub fn source(&self) -> Option<&str> {
        match &self.loaded {
            Loaded::Ready(url) => Some(url),
            _ => None,
        }
    }

    /// Whether the device has been asked to produce output.
    pub fn is_outputting(&self) -> bool {
        self.device_playing
    }

    /// Reconcile the device with `snapshot`.
    pub fn apply(&mut self, snapshot: &PlayerSnapshot) -> Vec<BindingEvent> {
        let mut events = Vec::new();

        let Some(track) = &snapshot.current_track else {
            if self.loaded != Loaded::Nothing {
                debug!("queue cleared, unloading");
                self.device.unload();
            }
            self.loaded = Loaded::Nothing;
            self.device_playing = false;
            self.end_reported = false;
            return events;
        };

        self.ensure_loaded(track.source());

        match self.loaded.clone() {
            Loaded::Nothing => {}
            Loaded::Broken { source, reason } => {
                if snapshot.is_playing {
                    events.push(BindingEvent::PlaybackFailed { source, reason });
                }
            }
            Loaded::Ready(url) => {
                if snapshot.is_playing && !self.device_playing {
                    match self.device.play() {
                        Ok(()) => {
                            self.device_playing = true;
                            self.end_reported = false;
                        }
                        Err(e) => {
                            warn!("playback of {url} rejected: {e}");
                            events.push(BindingEvent::PlaybackFailed {
                                source: Some(url),
                                reason: e.to_string(),
                            });
                        }
                    }
                } else if !snapshot.is_playing && self.device_playing {
                    self.device.pause();
                    self.device_playing = false;
                }
            }
        }

        events
    }

    /// Load `source` unless it is what the device already holds.
    fn ensure_loaded(&mut self, source: Option<&str>) {
        let unchanged = match (&self.loaded, source) {
            (Loaded::Ready(url), Some(s)) => url == s,
            (Loaded::Broken { source: prev, .. }, s) => prev.as_deref() == s,
            _ => false,
        };
        if unchanged {
            return;
        }

        self.device_playing = false;
        self.end_reported = false;

        self.loaded = match source {
            None => {
                self.device.unload();
                Loaded::Broken {
                    source: None,
                    reason: "track has no audio".to_string(),
                }
            }
            Some(url) => match self.device.load(url) {
                Ok(()) => {
                    debug!("loaded {url}");
                    Loaded::Ready(url.to_string())
                }
                Err(e) => {
                    warn!("failed to load {url}: {e}");
                    self.device.unload();
                    Loaded::Broken {
                        source: Some(url.to_string()),
                        reason: e.to_string(),
                    }
                }
            },
        };
    }

    /// Report a natural end of media, once per end.
    pub fn poll(&mut self) -> Option<BindingEvent> {
        let Loaded::Ready(url) = &self.loaded else {
            return None;
        };
        if !self.device_playing || self.end_reported || !self.device.finished() {
            return None;
        }

        self.end_reported = true;
        self.device_playing = false;
        debug!("{url} ended");
        Some(BindingEvent::Ended {
            source: Some(url.clone()),
        })
    }

    pub fn position(&self) -> Duration {
        match self.loaded {
            Loaded::Ready(_) => self.device.position(),
            _ => Duration::ZERO,
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        match self.loaded {
            Loaded::Ready(_) => self.device.duration(),
            _ => None,
        }
    }

    /// Jump to `position`. Play intent and queue are untouched.
    pub fn seek(&mut self, position: Duration) {
        if !matches!(self.loaded, Loaded::Ready(_)) {
            return;
        }
        let position = match self.device.duration() {
            Some(total) => position.min(total),
            None => position,
        };
        if let Err(e) = self.device.seek(position) {
            warn!("{e}");
        }
    }

    /// Scrub by `secs` relative to the current position, never before zero.
    pub fn seek_by(&mut self, secs: i64) {
        let delta = Duration::from_secs(secs.unsigned_abs());
        let current = self.position();
        let target = if secs >= 0 {
            current.saturating_add(delta)
        } else {
            current.saturating_sub(delta)
        };
        self.seek(target);
    }

    pub fn volume(&self) -> VolumeState {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume.set(volume);
        self.volume_changed();
    }

    pub fn change_volume(&mut self, delta: f32) {
        self.set_volume(self.volume.volume + delta);
    }

    pub fn toggle_mute(&mut self) {
        self.volume.muted = !self.volume.muted;
        self.volume_changed();
    }

    fn volume_changed(&mut self) {
        self.device.set_volume(self.volume.effective());
        if let Err(e) = self.volume_store.save(&self.volume) {
            warn!("failed to persist volume: {e}");
        }
    }

    /// Ramp the output down over `fade_out_ms` and release the source.
    pub fn fade_out(&mut self, fade_out_ms: u64) {
        if self.device_playing && fade_out_ms > 0 {
            let steps: u64 = 20;
            let step_ms = (fade_out_ms / steps).max(1);
            let start = self.volume.effective();
            for step in 1..=steps {
                let t = step as f32 / steps as f32;
                self.device.set_volume(start * (1.0 - t));
                thread::sleep(Duration::from_millis(step_ms));
            }
        }
        self.device.set_volume(0.0);
        self.device.unload();
        self.loaded = Loaded::Nothing;
        self.device_playing = false;
    }
}
