//! `rodio`-backed implementation of `AudioDevice`.
//!
//! Sources are local files addressed by `file://` URL or plain path; each
//! load builds a fresh paused `Sink` on the shared output stream.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use super::device::{AudioDevice, DeviceError};

/// Map an audio URL to a local file, or reject schemes this device cannot fetch.
pub(super) fn local_path(url: &str) -> Result<PathBuf, DeviceError> {
    if let Some(rest) = url.strip_prefix("file://") {
        // `file:///abs/path` and `file://localhost/abs/path`
        let rest = rest.strip_prefix("localhost").unwrap_or(rest);
        return Ok(PathBuf::from(rest));
    }
    if url.contains("://") {
        return Err(DeviceError::UnsupportedSource(url.to_string()));
    }
    Ok(PathBuf::from(url))
}

pub struct RodioDevice {
    stream: OutputStream,
    sink: Option<Sink>,
    url: Option<String>,
    duration: Option<Duration>,
    volume: f32,
}

impl RodioDevice {
    /// Open the default output device.
    pub fn open() -> Result<Self, DeviceError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| DeviceError::NoOutput(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped, which would land
        // on top of the TUI.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            sink: None,
            url: None,
            duration: None,
            volume: 1.0,
        })
    }

    /// Create a paused `Sink` for `url` positioned at zero.
    fn create_sink(&self, url: &str) -> Result<(Sink, Option<Duration>), DeviceError> {
        let path = local_path(url)?;
        let file = File::open(&path).map_err(|source| DeviceError::Open {
            url: url.to_string(),
            source,
        })?;

        let source = Decoder::new(BufReader::new(file)).map_err(|e| DeviceError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let duration = source.total_duration();

        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.volume);
        sink.append(source);
        sink.pause();
        Ok((sink, duration))
    }
}

impl AudioDevice for RodioDevice {
    fn load(&mut self, url: &str) -> Result<(), DeviceError> {
        self.unload();
        let (sink, duration) = self.create_sink(url)?;
        self.sink = Some(sink);
        self.url = Some(url.to_string());
        self.duration = duration;
        Ok(())
    }

    fn unload(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.url = None;
        self.duration = None;
    }

    fn play(&mut self) -> Result<(), DeviceError> {
        let Some(url) = self.url.clone() else {
            return Err(DeviceError::NothingLoaded);
        };

        // A drained sink cannot be rewound; rebuild it like a media element
        // restarting after `ended`.
        if self.sink.as_ref().is_none_or(Sink::empty) {
            if let Some(old) = self.sink.take() {
                old.stop();
            }
            let (sink, duration) = self.create_sink(&url)?;
            self.sink = Some(sink);
            self.duration = duration;
        }

        if let Some(sink) = &self.sink {
            sink.play();
        }
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn seek(&mut self, position: Duration) -> Result<(), DeviceError> {
        let Some(sink) = &self.sink else {
            return Err(DeviceError::NothingLoaded);
        };
        sink.try_seek(position)
            .map_err(|e| DeviceError::Seek(e.to_string()))
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(sink) = &self.sink {
            sink.set_volume(volume);
        }
    }

    fn position(&self) -> Duration {
        self.sink.as_ref().map_or(Duration::ZERO, Sink::get_pos)
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn finished(&self) -> bool {
        self.sink.as_ref().is_some_and(Sink::empty)
    }
}
