//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::app::App;
use crate::audio::{Coordinator, PlaybackInfo};
use crate::config::{ControlsSettings, TimeField, UiSettings};
use crate::library::{Track, display_line, format_clock, format_duration};

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(controls: &ControlsSettings) -> String {
    let volume_pct = (controls.volume_step * 100.0).round() as u32;
    [
        "[j/k] up/down".to_string(),
        "[enter] play list".to_string(),
        "[o] play track".to_string(),
        "[space/p] play/pause".to_string(),
        "[h/l] prev/next".to_string(),
        format!("[H/L] scrub -/+{}s", controls.scrub_seconds),
        format!("[+/-] volume {volume_pct}%"),
        "[m] mute".to_string(),
        "[z] follow".to_string(),
        "[/] search".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

/// Build the time text (elapsed/total/remaining) per `UiSettings`.
fn time_text(elapsed: Duration, total: Option<Duration>, ui: &UiSettings) -> Option<String> {
    let total = total.filter(|t| !t.is_zero());
    let mut parts: Vec<String> = Vec::new();
    for f in &ui.time_fields {
        match f {
            TimeField::Elapsed => parts.push(format_clock(elapsed)),
            TimeField::Total => parts.push(format_duration(total)),
            TimeField::Remaining => {
                if let Some(t) = total {
                    parts.push(format!("-{}", format_clock(t.saturating_sub(elapsed))));
                }
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.time_separator))
    }
}

fn volume_text(info: &PlaybackInfo) -> String {
    if info.muted {
        "Muted".to_string()
    } else {
        format!("Vol {}%", (info.volume * 100.0).round() as u32)
    }
}

/// Progress through the current track in `0.0..=1.0`.
fn progress_ratio(elapsed: Duration, total: Option<Duration>) -> f64 {
    match total {
        Some(t) if !t.is_zero() => (elapsed.as_secs_f64() / t.as_secs_f64()).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

fn track_item(track: &Track, duration: Option<Duration>, marker: &str) -> ListItem<'static> {
    ListItem::new(Line::from(vec![
        Span::raw(marker.to_string()),
        Span::raw(display_line(track)),
        Span::raw("  "),
        Span::raw(format_duration(duration)).dim(),
    ]))
}

/// Render the entire UI into the provided `frame`.
///
/// `playback` is what the audio thread last reported; it only describes the
/// current track when its `source` matches the coordinator's.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    coordinator: &Coordinator,
    playback: &PlaybackInfo,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" indiesound ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Track list
    {
        let display = app.display_indices();
        let current = coordinator.current_track();

        // Only build ListItems for the visible window, centred on the selection.
        let total = display.len();
        let list_height = chunks[1].height.saturating_sub(2) as usize;
        let sel_pos = display.iter().position(|&i| i == app.selected).unwrap_or(0);
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = sel_pos.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let items: Vec<ListItem> = display[start..end]
            .iter()
            .map(|&i| {
                let entry = &app.entries[i];
                let is_current = current.is_some_and(|t| t.same_entry(&entry.track));
                let marker = match (is_current, coordinator.is_playing()) {
                    (true, true) => "▶ ",
                    (true, false) => "‖ ",
                    _ => "  ",
                };
                let item = track_item(&entry.track, entry.duration, marker);
                if is_current {
                    item.add_modifier(Modifier::BOLD)
                } else {
                    item
                }
            })
            .collect();

        let mut title = format!(" tracks ({}) ", app.entries.len());
        let q = app.filter_query.trim();
        if app.filter_mode || !q.is_empty() {
            let cursor = if app.filter_mode { "_" } else { "" };
            title = format!(" tracks ({}/{}) search: {q}{cursor} ", total, app.entries.len());
        }

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[1], &mut state);
    }

    // Player bar
    {
        let block = Block::bordered()
            .padding(Padding {
                left: 1,
                right: 1,
                top: 0,
                bottom: 0,
            })
            .title(" player ");
        let inner = block.inner(chunks[2]);
        frame.render_widget(block, chunks[2]);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(inner);

        let track = coordinator.current_track();
        let on_device = track.is_some_and(|t| t.source() == playback.source.as_deref());
        let (elapsed, total) = match track {
            Some(t) if on_device => (
                playback.elapsed,
                playback.duration.or_else(|| entry_duration(app, t)),
            ),
            Some(t) => (Duration::ZERO, entry_duration(app, t)),
            None => (Duration::ZERO, None),
        };

        let now_playing = match track {
            Some(t) => {
                let state = if coordinator.is_playing() {
                    "Playing"
                } else {
                    "Paused"
                };
                let position = match (coordinator.current_index(), coordinator.queue().len()) {
                    (Some(i), len) => format!(" [{}/{}]", i + 1, len),
                    (None, _) => String::new(),
                };
                Line::from(vec![
                    Span::raw(format!("{state}{position}: ")).bold(),
                    Span::raw(t.title.clone()),
                    Span::raw(" · ").dim(),
                    Span::raw(t.artist.clone()).italic(),
                ])
            }
            None => Line::from("Nothing queued").dim(),
        };
        frame.render_widget(Paragraph::new(now_playing), rows[0]);

        let time = time_text(elapsed, total, ui_settings).unwrap_or_default();
        let gauge = Gauge::default()
            .ratio(progress_ratio(elapsed, total))
            .label(time)
            .use_unicode(true);
        frame.render_widget(gauge, rows[1]);

        frame.render_widget(Paragraph::new(volume_text(playback)), rows[2]);
    }

    let footer = Paragraph::new(controls_text(controls_settings))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[3]);
}

fn entry_duration(app: &App, track: &Track) -> Option<Duration> {
    app.index_of(track).and_then(|i| app.entries[i].duration)
}
