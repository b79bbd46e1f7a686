//! Key bindings and what they do to the app and the playback queue.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::audio::{AudioCmd, Coordinator};
use crate::config::ControlsSettings;

use super::model::App;

/// A user intent, decoupled from the key that produced it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Down,
    Up,
    Top,
    Bottom,
    /// Queue the visible list and start at the selected track.
    PlayInContext,
    /// Play only the selected track, without touching the rest of the queue.
    PlaySelected,
    TogglePlay,
    Next,
    Prev,
    ScrubForward,
    ScrubBack,
    VolumeUp,
    VolumeDown,
    ToggleMute,
    /// Jump the cursor to the current track and follow it again.
    FollowPlayback,
    EnterFilter,
    FilterChar(char),
    FilterBackspace,
    FilterCancel,
    /// Leave filter mode and play the selected track within the filtered list.
    FilterAccept,
}

/// What the runtime still has to do after a command ran.
#[derive(Debug, PartialEq)]
pub enum Effect {
    None,
    Audio(AudioCmd),
    Quit,
}

/// Map a key press to a command. `None` for unbound keys.
pub fn command_for_key(key: KeyEvent, filter_mode: bool) -> Option<Command> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if filter_mode {
        return match key.code {
            KeyCode::Esc => Some(Command::FilterCancel),
            KeyCode::Backspace => Some(Command::FilterBackspace),
            KeyCode::Enter => Some(Command::FilterAccept),
            KeyCode::Down => Some(Command::Down),
            KeyCode::Up => Some(Command::Up),
            KeyCode::Char('j' | 'n') if ctrl => Some(Command::Down),
            KeyCode::Char('k' | 'p') if ctrl => Some(Command::Up),
            KeyCode::Char(c) if !c.is_control() && !ctrl => Some(Command::FilterChar(c)),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('c') if ctrl => Some(Command::Quit),
        KeyCode::Char('q') => Some(Command::Quit),
        KeyCode::Char('j') | KeyCode::Down => Some(Command::Down),
        KeyCode::Char('k') | KeyCode::Up => Some(Command::Up),
        KeyCode::Char('g') | KeyCode::Home => Some(Command::Top),
        KeyCode::Char('G') | KeyCode::End => Some(Command::Bottom),
        KeyCode::Enter => Some(Command::PlayInContext),
        KeyCode::Char('o') => Some(Command::PlaySelected),
        KeyCode::Char(' ' | 'p') => Some(Command::TogglePlay),
        KeyCode::Char('l') => Some(Command::Next),
        KeyCode::Char('h') => Some(Command::Prev),
        KeyCode::Char('L') => Some(Command::ScrubForward),
        KeyCode::Char('H') => Some(Command::ScrubBack),
        KeyCode::Char('+' | '=') => Some(Command::VolumeUp),
        KeyCode::Char('-') => Some(Command::VolumeDown),
        KeyCode::Char('m') => Some(Command::ToggleMute),
        KeyCode::Char('z') => Some(Command::FollowPlayback),
        KeyCode::Char('/') => Some(Command::EnterFilter),
        _ => None,
    }
}

/// Run `cmd` against the app and the coordinator.
///
/// Queue changes go straight to `coordinator`; the runtime forwards the
/// resulting snapshots to the audio thread. Device-only commands (seek,
/// volume) come back as an `Effect`.
pub fn apply(
    cmd: Command,
    app: &mut App,
    coordinator: &mut Coordinator,
    controls: &ControlsSettings,
) -> Effect {
    match cmd {
        Command::Quit => return Effect::Quit,
        Command::Down => {
            app.follow_playback_off();
            app.next();
        }
        Command::Up => {
            app.follow_playback_off();
            app.prev();
        }
        Command::Top => {
            app.follow_playback_off();
            app.select_first();
        }
        Command::Bottom => {
            app.follow_playback_off();
            app.select_last();
        }
        Command::PlayInContext => play_in_context(app, coordinator),
        Command::PlaySelected => {
            if let Some(entry) = app.selected_entry() {
                let track = entry.track.clone();
                app.follow_playback_on();
                coordinator.play_track(track);
            }
        }
        Command::TogglePlay => {
            if coordinator.current_track().is_some() {
                coordinator.toggle_play();
            }
        }
        Command::Next => {
            app.follow_playback_on();
            coordinator.next_track();
        }
        Command::Prev => {
            app.follow_playback_on();
            let at_start = coordinator.current_index() == Some(0);
            coordinator.prev_track();
            // The cursor cannot move back, so restart the track instead.
            if at_start {
                return Effect::Audio(AudioCmd::Seek(Duration::ZERO));
            }
        }
        Command::ScrubForward => return Effect::Audio(AudioCmd::SeekBy(scrub_secs(controls))),
        Command::ScrubBack => return Effect::Audio(AudioCmd::SeekBy(-scrub_secs(controls))),
        Command::VolumeUp => return Effect::Audio(AudioCmd::ChangeVolume(controls.volume_step)),
        Command::VolumeDown => {
            return Effect::Audio(AudioCmd::ChangeVolume(-controls.volume_step));
        }
        Command::ToggleMute => return Effect::Audio(AudioCmd::ToggleMute),
        Command::FollowPlayback => {
            app.follow_playback_on();
            app.follow(coordinator.current_track());
        }
        Command::EnterFilter => app.enter_filter_mode(),
        Command::FilterChar(c) => app.push_filter_char(c),
        Command::FilterBackspace => app.pop_filter_char(),
        Command::FilterCancel => app.clear_filter(),
        Command::FilterAccept => {
            if app.display_indices().is_empty() {
                return Effect::None;
            }
            app.exit_filter_mode();
            play_in_context(app, coordinator);
        }
    }

    Effect::None
}

fn scrub_secs(controls: &ControlsSettings) -> i64 {
    controls.scrub_seconds.min(i64::MAX as u64) as i64
}

/// Queue the whole visible list and play it from the top.
pub fn play_all(app: &mut App, coordinator: &mut Coordinator) {
    app.select_first();
    app.follow_playback_on();
    coordinator.set_queue(app.visible_tracks(), 0);
}

/// Pressing play on the track that is already playing pauses it; anything
/// else replaces the queue with the visible list.
fn play_in_context(app: &mut App, coordinator: &mut Coordinator) {
    let Some(entry) = app.selected_entry() else {
        return;
    };

    let is_current = coordinator
        .current_track()
        .is_some_and(|t| t.same_entry(&entry.track));
    if is_current && coordinator.is_playing() {
        coordinator.toggle_play();
        return;
    }

    let Some(start) = app.selected_position() else {
        return;
    };
    app.follow_playback_on();
    coordinator.set_queue(app.visible_tracks(), start);
}
