//! Scriptable `AudioDevice` for tests.

use std::collections::HashSet;
use std::time::Duration;

use super::device::{AudioDevice, DeviceError};

#[derive(Default)]
pub(crate) struct FakeDevice {
    pub calls: Vec<String>,
    pub broken: HashSet<String>,
    pub reject_play: bool,
    pub finished: bool,
    pub position: Duration,
    pub volume: f32,
}

impl AudioDevice for FakeDevice {
    fn load(&mut self, url: &str) -> Result<(), DeviceError> {
        self.calls.push(format!("load {url}"));
        self.finished = false;
        self.position = Duration::ZERO;
        if self.broken.contains(url) {
            return Err(DeviceError::Decode {
                url: url.to_string(),
                reason: "bad header".into(),
            });
        }
        Ok(())
    }

    fn unload(&mut self) {
        self.calls.push("unload".into());
    }

    fn play(&mut self) -> Result<(), DeviceError> {
        if self.reject_play {
            self.calls.push("play rejected".into());
            return Err(DeviceError::NothingLoaded);
        }
        if self.finished {
            self.finished = false;
            self.position = Duration::ZERO;
        }
        self.calls.push("play".into());
        Ok(())
    }

    fn pause(&mut self) {
        self.calls.push("pause".into());
    }

    fn seek(&mut self, position: Duration) -> Result<(), DeviceError> {
        self.calls.push(format!("seek {}", position.as_secs()));
        self.position = position;
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn position(&self) -> Duration {
        self.position
    }

    fn duration(&self) -> Option<Duration> {
        Some(Duration::from_secs(200))
    }

    fn finished(&self) -> bool {
        self.finished
    }
}
