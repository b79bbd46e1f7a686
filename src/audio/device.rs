use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("no audio output device: {0}")]
    NoOutput(String),

    #[error("cannot open {url}: {source}")]
    Open {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("unsupported source {0}")]
    UnsupportedSource(String),

    #[error("nothing loaded")]
    NothingLoaded,

    #[error("seek failed: {0}")]
    Seek(String),
}

/// The rendering primitive the output binding drives.
///
/// Only the binding talks to a device. Implementations start every loaded
/// source paused at position zero.
pub trait AudioDevice {
    /// Replace the current source with `url`, paused at zero.
    fn load(&mut self, url: &str) -> Result<(), DeviceError>;

    /// Stop and drop the current source.
    fn unload(&mut self);

    /// Start or resume output. A finished source restarts from zero.
    fn play(&mut self) -> Result<(), DeviceError>;

    /// Pause without dropping the source.
    fn pause(&mut self);

    fn seek(&mut self, position: Duration) -> Result<(), DeviceError>;

    /// Output gain in `0.0..=1.0`.
    fn set_volume(&mut self, volume: f32);

    fn position(&self) -> Duration;

    fn duration(&self) -> Option<Duration>;

    /// True once a loaded source has played to its end.
    fn finished(&self) -> bool;
}
