use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error};

use super::binding::AudioBinding;
use super::device::{AudioDevice, DeviceError};
use super::sink::RodioDevice;
use super::types::{AudioCmd, BindingEvent, PlaybackHandle};
use super::volume::VolumeStore;

/// Spawn the thread that owns the output device.
///
/// The output stream is opened on the new thread; an open failure is reported
/// back before this returns.
pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    events: Sender<BindingEvent>,
    playback_info: PlaybackHandle,
    volume_store: VolumeStore,
    tick: Duration,
) -> Result<JoinHandle<()>, DeviceError> {
    let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), DeviceError>>(1);

    let handle = thread::Builder::new()
        .name("audio".into())
        .spawn(move || {
            let device = match RodioDevice::open() {
                Ok(d) => {
                    let _ = ready_tx.send(Ok(()));
                    d
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };

            let binding = AudioBinding::new(device, volume_store);
            run_binding(binding, rx, events, playback_info, tick);
        })
        .map_err(|e| DeviceError::NoOutput(e.to_string()))?;

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(handle),
        Ok(Err(e)) => {
            let _ = handle.join();
            Err(e)
        }
        Err(_) => Err(DeviceError::NoOutput("audio thread exited".into())),
    }
}

/// Command loop: apply commands as they arrive and poll the device for natural
/// ends between them.
pub(super) fn run_binding<D: AudioDevice>(
    mut binding: AudioBinding<D>,
    rx: Receiver<AudioCmd>,
    events: Sender<BindingEvent>,
    playback_info: PlaybackHandle,
    tick: Duration,
) {
    publish_info(&binding, &playback_info);

    loop {
        match rx.recv_timeout(tick) {
            Ok(cmd) => match cmd {
                AudioCmd::Sync(snapshot) => {
                    for event in binding.apply(&snapshot) {
                        if events.send(event).is_err() {
                            debug!("event receiver gone");
                        }
                    }
                }
                AudioCmd::Seek(position) => binding.seek(position),
                AudioCmd::SeekBy(secs) => binding.seek_by(secs),
                AudioCmd::ChangeVolume(delta) => binding.change_volume(delta),
                AudioCmd::ToggleMute => binding.toggle_mute(),
                AudioCmd::Quit { fade_out_ms } => {
                    binding.fade_out(fade_out_ms);
                    publish_info(&binding, &playback_info);
                    break;
                }
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                binding.fade_out(0);
                break;
            }
        }

        if let Some(event) = binding.poll() {
            if events.send(event).is_err() {
                error!("dropping end-of-track event: receiver gone");
            }
        }

        publish_info(&binding, &playback_info);
    }

    debug!("audio thread finished");
}

fn publish_info<D: AudioDevice>(binding: &AudioBinding<D>, playback_info: &PlaybackHandle) {
    if let Ok(mut info) = playback_info.lock() {
        let volume = binding.volume();
        info.source = binding.source().map(str::to_string);
        info.elapsed = binding.position();
        info.duration = binding.duration();
        info.playing = binding.is_outputting();
        info.volume = volume.volume;
        info.muted = volume.muted;
    }
}
