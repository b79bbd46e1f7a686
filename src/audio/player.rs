use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use log::warn;

use super::device::DeviceError;
use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, BindingEvent, PlaybackHandle, PlaybackInfo};
use super::volume::VolumeStore;

/// UI-side handle to the audio thread.
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    events: Receiver<BindingEvent>,
    playback: PlaybackHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    pub fn new(volume_store: VolumeStore, tick: Duration) -> Result<Self, DeviceError> {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (event_tx, event_rx) = mpsc::channel::<BindingEvent>();
        let playback_info: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));

        let audio_handle =
            spawn_audio_thread(rx, event_tx, playback_info.clone(), volume_store, tick)?;

        Ok(Self {
            tx,
            events: event_rx,
            playback: playback_info,
            join: Mutex::new(Some(audio_handle)),
        })
    }

    pub fn playback_handle(&self) -> PlaybackHandle {
        self.playback.clone()
    }

    pub fn send(&self, cmd: AudioCmd) -> Result<(), mpsc::SendError<AudioCmd>> {
        self.tx.send(cmd)
    }

    /// Next pending device event, if any.
    pub fn try_event(&self) -> Option<BindingEvent> {
        self.events.try_recv().ok()
    }

    pub fn quit_softly(&self, fade_out: Duration) {
        if self
            .send(AudioCmd::Quit {
                fade_out_ms: fade_out.as_millis() as u64,
            })
            .is_err()
        {
            warn!("audio thread already gone");
        }

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}
