use super::*;
use crate::audio::{AudioCmd, Coordinator};
use crate::config::ControlsSettings;
use crate::library::{CatalogEntry, Track};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;

fn entry(id: u64, title: &str, artist: &str) -> CatalogEntry {
    CatalogEntry {
        id,
        track: Track::new(title, artist).with_audio_url(format!("file:///music/{id}.mp3")),
        duration: None,
        genre: None,
    }
}

fn app() -> App {
    App::new(vec![
        entry(1, "Alpha", "Night Owls"),
        entry(2, "Beta", "Sun Dogs"),
        entry(3, "Gamma", "Night Owls"),
        entry(4, "Delta", "Moths"),
    ])
}

fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

fn run(app: &mut App, coordinator: &mut Coordinator, cmd: Command) -> Effect {
    apply(cmd, app, coordinator, &ControlsSettings::default())
}

#[test]
fn filter_matches_title_or_artist_substring() {
    let mut app = app();
    app.filter_query = "night".into();
    assert_eq!(app.display_indices(), vec![0, 2]);

    app.filter_query = "ELT".into();
    assert_eq!(app.display_indices(), vec![3]);

    // Not a subsequence matcher.
    app.filter_query = "agm".into();
    assert!(app.display_indices().is_empty());
}

#[test]
fn filter_does_not_match_across_title_and_artist() {
    let mut app = app();
    app.filter_query = "alphanight".into();
    assert!(app.display_indices().is_empty());
}

#[test]
fn selection_wraps_within_filtered_view() {
    let mut app = app();
    app.filter_query = "night".into();
    app.set_selected(0);
    app.next();
    assert_eq!(app.selected, 2);
    app.next();
    assert_eq!(app.selected, 0);
    app.prev();
    assert_eq!(app.selected, 2);
}

#[test]
fn filtering_moves_hidden_selection_to_first_match() {
    let mut app = app();
    app.set_selected(1);
    for c in "moth".chars() {
        app.push_filter_char(c);
    }
    assert_eq!(app.selected, 3);

    app.push_filter_char('z');
    assert!(app.display_indices().is_empty());
    assert_eq!(app.selected, 0);
}

#[test]
fn visible_tracks_follow_filter_order() {
    let mut app = app();
    app.filter_query = "night".into();
    let titles: Vec<String> = app.visible_tracks().into_iter().map(|t| t.title).collect();
    assert_eq!(titles, vec!["Alpha", "Gamma"]);
}

#[test]
fn play_in_context_queues_visible_list_from_selection() {
    let mut app = app();
    let mut c = Coordinator::new();
    app.filter_query = "night".into();
    app.set_selected(2);

    assert_eq!(run(&mut app, &mut c, Command::PlayInContext), Effect::None);
    assert_eq!(c.queue().len(), 2);
    assert_eq!(c.current_index(), Some(1));
    assert_eq!(c.current_track().unwrap().title, "Gamma");
    assert!(c.is_playing());
}

#[test]
fn play_all_queues_list_in_order_from_the_top() {
    // A playlist view: play order, not alphabetical.
    let mut app = App::new(vec![
        entry(9, "Zulu", "Moths"),
        entry(2, "Beta", "Sun Dogs"),
        entry(5, "Echo", "Night Owls"),
    ]);
    app.set_selected(2);
    let mut c = Coordinator::new();

    play_all(&mut app, &mut c);
    let titles: Vec<&str> = c.queue().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Zulu", "Beta", "Echo"]);
    assert_eq!(c.current_index(), Some(0));
    assert!(c.is_playing());
    assert_eq!(app.selected, 0);
}

#[test]
fn play_all_on_empty_list_leaves_nothing_queued() {
    let mut app = App::new(Vec::new());
    let mut c = Coordinator::new();
    play_all(&mut app, &mut c);
    assert_eq!(c.current_index(), None);
    assert!(!c.is_playing());
}

#[test]
fn play_in_context_on_playing_track_pauses() {
    let mut app = app();
    let mut c = Coordinator::new();
    app.set_selected(1);
    run(&mut app, &mut c, Command::PlayInContext);
    assert!(c.is_playing());

    run(&mut app, &mut c, Command::PlayInContext);
    assert!(!c.is_playing());
    assert_eq!(c.current_index(), Some(1));

    run(&mut app, &mut c, Command::PlayInContext);
    assert!(c.is_playing());
    assert_eq!(c.queue().len(), 4);
}

#[test]
fn play_selected_keeps_existing_queue_when_queued() {
    let mut app = app();
    let mut c = Coordinator::new();
    run(&mut app, &mut c, Command::PlayInContext);

    app.set_selected(3);
    run(&mut app, &mut c, Command::PlaySelected);
    assert_eq!(c.queue().len(), 4);
    assert_eq!(c.current_index(), Some(3));
}

#[test]
fn play_selected_on_empty_queue_plays_single_track() {
    let mut app = app();
    let mut c = Coordinator::new();
    app.set_selected(2);
    run(&mut app, &mut c, Command::PlaySelected);
    assert_eq!(c.queue().len(), 1);
    assert_eq!(c.current_track().unwrap().title, "Gamma");
}

#[test]
fn toggle_without_current_track_does_nothing() {
    let mut app = app();
    let mut c = Coordinator::new();
    run(&mut app, &mut c, Command::TogglePlay);
    assert!(!c.is_playing());
    assert_eq!(c.current_index(), None);
}

#[test]
fn prev_on_first_track_restarts_it() {
    let mut app = app();
    let mut c = Coordinator::new();
    c.set_queue(app.visible_tracks(), 0);
    c.pause();

    assert_eq!(
        run(&mut app, &mut c, Command::Prev),
        Effect::Audio(AudioCmd::Seek(Duration::ZERO))
    );
    assert_eq!(c.current_index(), Some(0));
    assert!(c.is_playing());
}

#[test]
fn prev_past_first_track_moves_back_without_seeking() {
    let mut app = app();
    let mut c = Coordinator::new();
    c.set_queue(app.visible_tracks(), 2);

    assert_eq!(run(&mut app, &mut c, Command::Prev), Effect::None);
    assert_eq!(c.current_index(), Some(1));
    assert_eq!(run(&mut app, &mut c, Command::Prev), Effect::None);
    assert_eq!(c.current_index(), Some(0));
}

#[test]
fn prev_with_empty_queue_does_nothing() {
    let mut app = app();
    let mut c = Coordinator::new();
    assert_eq!(run(&mut app, &mut c, Command::Prev), Effect::None);
    assert_eq!(c.current_index(), None);
}

#[test]
fn device_commands_become_audio_effects() {
    let mut app = app();
    let mut c = Coordinator::new();
    let controls = ControlsSettings {
        scrub_seconds: 7,
        volume_step: 0.25,
    };

    assert_eq!(
        apply(Command::ScrubForward, &mut app, &mut c, &controls),
        Effect::Audio(AudioCmd::SeekBy(7))
    );
    assert_eq!(
        apply(Command::ScrubBack, &mut app, &mut c, &controls),
        Effect::Audio(AudioCmd::SeekBy(-7))
    );
    assert_eq!(
        apply(Command::VolumeDown, &mut app, &mut c, &controls),
        Effect::Audio(AudioCmd::ChangeVolume(-0.25))
    );
    assert_eq!(
        apply(Command::ToggleMute, &mut app, &mut c, &controls),
        Effect::Audio(AudioCmd::ToggleMute)
    );
    assert_eq!(apply(Command::Quit, &mut app, &mut c, &controls), Effect::Quit);
}

#[test]
fn filter_accept_plays_within_filtered_list() {
    let mut app = app();
    let mut c = Coordinator::new();
    run(&mut app, &mut c, Command::EnterFilter);
    for ch in "owls".chars() {
        run(&mut app, &mut c, Command::FilterChar(ch));
    }
    run(&mut app, &mut c, Command::FilterAccept);

    assert!(!app.filter_mode);
    assert_eq!(app.filter_query, "owls");
    assert_eq!(c.queue().len(), 2);
    assert_eq!(c.current_track().unwrap().title, "Alpha");
}

#[test]
fn filter_accept_with_no_matches_stays_in_filter_mode() {
    let mut app = app();
    let mut c = Coordinator::new();
    run(&mut app, &mut c, Command::EnterFilter);
    run(&mut app, &mut c, Command::FilterChar('#'));
    run(&mut app, &mut c, Command::FilterAccept);
    assert!(app.filter_mode);
    assert_eq!(c.current_index(), None);
}

#[test]
fn cursor_follows_playback_until_user_moves_it() {
    let mut app = app();
    let mut c = Coordinator::new();
    run(&mut app, &mut c, Command::PlayInContext);
    run(&mut app, &mut c, Command::Next);
    app.follow(c.current_track());
    assert_eq!(app.selected, 1);

    run(&mut app, &mut c, Command::Down);
    c.next_track();
    app.follow(c.current_track());
    assert_eq!(app.selected, 2);
    assert!(!app.follow_playback);

    run(&mut app, &mut c, Command::FollowPlayback);
    assert_eq!(app.selected, 2);
    c.next_track();
    app.follow(c.current_track());
    assert_eq!(app.selected, 3);
}

#[test]
fn keys_map_to_commands() {
    assert_eq!(command_for_key(key('q'), false), Some(Command::Quit));
    assert_eq!(command_for_key(key(' '), false), Some(Command::TogglePlay));
    assert_eq!(command_for_key(key('p'), false), Some(Command::TogglePlay));
    assert_eq!(command_for_key(key('o'), false), Some(Command::PlaySelected));
    assert_eq!(command_for_key(key('L'), false), Some(Command::ScrubForward));
    assert_eq!(command_for_key(key('+'), false), Some(Command::VolumeUp));
    assert_eq!(command_for_key(key('x'), false), None);
    assert_eq!(
        command_for_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), false),
        Some(Command::PlayInContext)
    );
}

#[test]
fn filter_mode_captures_printable_keys() {
    assert_eq!(command_for_key(key('q'), true), Some(Command::FilterChar('q')));
    assert_eq!(
        command_for_key(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL), true),
        Some(Command::Down)
    );
    assert_eq!(
        command_for_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE), true),
        Some(Command::FilterCancel)
    );
}
