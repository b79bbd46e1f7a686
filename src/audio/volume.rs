//! Output volume and its persistence between sessions.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("state file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid state file: {0}")]
    Decode(#[from] toml::de::Error),

    #[error("failed to encode state: {0}")]
    Encode(#[from] toml::ser::Error),
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeState {
    pub volume: f32,
    pub muted: bool,
}

impl Default for VolumeState {
    fn default() -> Self {
        Self {
            volume: 1.0,
            muted: false,
        }
    }
}

impl VolumeState {
    /// Gain actually applied to the device.
    pub fn effective(&self) -> f32 {
        if self.muted { 0.0 } else { self.volume }
    }

    pub fn set(&mut self, volume: f32) {
        self.volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            self.volume
        };
    }
}

/// Small TOML key-value file holding the last volume and mute flag.
#[derive(Debug, Clone)]
pub struct VolumeStore {
    path: Option<PathBuf>,
}

impl VolumeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self { path: None }
    }

    pub fn read(&self) -> Result<VolumeState, StateError> {
        let Some(path) = &self.path else {
            return Ok(VolumeState::default());
        };

        match fs::read_to_string(path) {
            Ok(text) => {
                let mut state: VolumeState = toml::from_str(&text)?;
                state.volume = if state.volume.is_finite() {
                    state.volume.clamp(0.0, 1.0)
                } else {
                    VolumeState::default().volume
                };
                Ok(state)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(VolumeState::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Like `read`, but a broken file only costs a warning.
    pub fn load(&self) -> VolumeState {
        self.read().unwrap_or_else(|e| {
            warn!("ignoring saved volume: {e}");
            VolumeState::default()
        })
    }

    pub fn save(&self, state: &VolumeState) -> Result<(), StateError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string(state)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_full_volume() {
        let dir = tempdir().unwrap();
        let store = VolumeStore::new(dir.path().join("state.toml"));
        assert_eq!(store.read().unwrap(), VolumeState::default());
    }

    #[test]
    fn save_then_read_keeps_volume_and_mute() {
        let dir = tempdir().unwrap();
        let store = VolumeStore::new(dir.path().join("nested").join("state.toml"));
        let state = VolumeState {
            volume: 0.25,
            muted: true,
        };
        store.save(&state).unwrap();
        assert_eq!(store.read().unwrap(), state);
    }

    #[test]
    fn out_of_range_volume_is_clamped_on_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.toml");
        std::fs::write(&path, "volume = 7.5\n").unwrap();
        let state = VolumeStore::new(&path).read().unwrap();
        assert_eq!(state.volume, 1.0);
        assert!(!state.muted);
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.toml");
        std::fs::write(&path, "volume = [").unwrap();
        let store = VolumeStore::new(&path);
        assert!(matches!(store.read(), Err(StateError::Decode(_))));
        assert_eq!(store.load(), VolumeState::default());
    }

    #[test]
    fn muted_state_has_zero_effective_gain() {
        let mut state = VolumeState::default();
        state.set(0.6);
        assert_eq!(state.effective(), 0.6);
        state.muted = true;
        assert_eq!(state.effective(), 0.0);
        state.set(f32::NAN);
        assert_eq!(state.volume, 0.6);
    }
}
