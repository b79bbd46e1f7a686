use std::sync::mpsc::Receiver;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use log::{debug, warn};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{self, App, Effect};
use crate::audio::{AudioCmd, AudioPlayer, BindingEvent, Coordinator, PlayerSnapshot};
use crate::config;
use crate::ui;

/// Main terminal event loop: feeds device events into the coordinator,
/// forwards its snapshots to the audio thread, draws and handles one key.
/// Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    coordinator: &mut Coordinator,
    snapshots: &Receiver<PlayerSnapshot>,
    audio_player: &AudioPlayer,
) -> Result<(), Box<dyn std::error::Error>> {
    let playback_handle = audio_player.playback_handle();

    loop {
        drain_device_events(coordinator, audio_player);

        // The binding reconciles to state, so only the newest snapshot matters.
        if let Some(snapshot) = snapshots.try_iter().last() {
            audio_player
                .send(AudioCmd::Sync(snapshot))
                .map_err(|_| "audio thread stopped")?;
        }

        app.follow(coordinator.current_track());

        let playback = playback_handle
            .lock()
            .map(|info| info.clone())
            .unwrap_or_default();
        terminal.draw(|f| {
            ui::draw(
                f,
                app,
                coordinator,
                &playback,
                &settings.ui,
                &settings.controls,
            )
        })?;

        if event::poll(Duration::from_millis(50))? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let Some(cmd) = app::command_for_key(key, app.filter_mode) else {
                continue;
            };

            match app::apply(cmd, app, coordinator, &settings.controls) {
                Effect::None => {}
                Effect::Audio(cmd) => {
                    if audio_player.send(cmd).is_err() {
                        warn!("audio thread stopped; dropping command");
                    }
                }
                Effect::Quit => {
                    audio_player
                        .quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
                    return Ok(());
                }
            }
        }
    }
}

/// Failures only show up as the player falling back to paused.
fn drain_device_events(coordinator: &mut Coordinator, audio_player: &AudioPlayer) {
    while let Some(event) = audio_player.try_event() {
        if !event.apply_to(coordinator) {
            debug!("ignoring stale {event:?}");
            continue;
        }
        if let BindingEvent::PlaybackFailed { source, reason } = &event {
            warn!("playback of {} failed: {reason}", source.as_deref().unwrap_or("<no audio>"));
        }
    }
}
