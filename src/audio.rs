//! Playback: the queue coordinator and the output binding that drives the
//! audio device from it.
//!
//! The coordinator lives on the UI thread. The binding and its `rodio`
//! device live on the audio thread, fed with coordinator snapshots through
//! `AudioPlayer`.

mod binding;
mod coordinator;
mod device;
#[cfg(test)]
mod fake_device;
mod player;
mod sink;
mod thread;
mod types;
mod volume;

pub use coordinator::{Coordinator, PlayerSnapshot};
pub use player::AudioPlayer;
pub use types::{AudioCmd, BindingEvent, PlaybackInfo};
pub use volume::VolumeStore;
