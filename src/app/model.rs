//! Application model: the browsable catalog, the cursor and the search filter.
//!
//! Playback state is not duplicated here; the runtime owns the
//! `Coordinator` and the UI reads it directly.

use crate::library::{CatalogEntry, Track};

/// The main application model.
pub struct App {
    pub entries: Vec<CatalogEntry>,
    /// Index into `entries`.
    pub selected: usize,

    /// Lowercased `title\nartist` per entry, for filtering.
    search_keys: Vec<String>,

    /// Whether the cursor jumps to the current track when playback moves.
    pub follow_playback: bool,
    pub filter_mode: bool,
    pub filter_query: String,
}

impl App {
    /// Create a new `App` over the catalog `entries`.
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let search_keys = entries
            .iter()
            .map(|e| format!("{}\n{}", e.track.title, e.track.artist).to_lowercase())
            .collect();

        Self {
            entries,
            selected: 0,
            search_keys,
            follow_playback: true,
            filter_mode: false,
            filter_query: String::new(),
        }
    }

    /// Indices of the entries matching the filter, in catalog order.
    ///
    /// The query is a case-insensitive substring of the title or the artist.
    pub fn display_indices(&self) -> Vec<usize> {
        let query = self.filter_query.trim().to_lowercase();
        if query.is_empty() {
            return (0..self.entries.len()).collect();
        }

        self.search_keys
            .iter()
            .enumerate()
            .filter(|(_, key)| key.split('\n').any(|field| field.contains(&query)))
            .map(|(i, _)| i)
            .collect()
    }

    /// The tracks of the current view, in order. This is the queue handed to
    /// the coordinator when playing in list context.
    pub fn visible_tracks(&self) -> Vec<Track> {
        self.display_indices()
            .into_iter()
            .map(|i| self.entries[i].track.clone())
            .collect()
    }

    pub fn selected_entry(&self) -> Option<&CatalogEntry> {
        self.entries.get(self.selected)
    }

    /// Position of the selected entry within the current view.
    pub fn selected_position(&self) -> Option<usize> {
        self.display_indices().iter().position(|&i| i == self.selected)
    }

    /// First entry that is the same queue entry as `track`.
    pub fn index_of(&self, track: &Track) -> Option<usize> {
        self.entries.iter().position(|e| e.track.same_entry(track))
    }

    /// Set the selected index and ensure it is visible in the display.
    pub fn set_selected(&mut self, idx: usize) {
        self.selected = idx;
        self.ensure_selected_visible();
    }

    /// Move the cursor to `current` when following playback outside filter mode.
    pub fn follow(&mut self, current: Option<&Track>) {
        if !self.follow_playback || self.filter_mode {
            return;
        }
        if let Some(idx) = current.and_then(|t| self.index_of(t)) {
            if idx != self.selected {
                self.set_selected(idx);
            }
        }
    }

    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    /// Move selection to the next visible track, wrapping to the first.
    pub fn next(&mut self) {
        let display = self.display_indices();
        if display.is_empty() {
            return;
        }
        self.selected = match display.iter().position(|&i| i == self.selected) {
            Some(p) => display[(p + 1) % display.len()],
            None => display[0],
        };
    }

    /// Move selection to the previous visible track, wrapping to the last.
    pub fn prev(&mut self) {
        let display = self.display_indices();
        let Some(&last) = display.last() else {
            return;
        };
        self.selected = match display.iter().position(|&i| i == self.selected) {
            Some(0) | None => last,
            Some(p) => display[p - 1],
        };
    }

    pub fn select_first(&mut self) {
        if let Some(&first) = self.display_indices().first() {
            self.selected = first;
        }
    }

    pub fn select_last(&mut self) {
        if let Some(&last) = self.display_indices().last() {
            self.selected = last;
        }
    }

    /// Enter filter mode: stop following playback so typing is not interrupted.
    pub fn enter_filter_mode(&mut self) {
        self.filter_mode = true;
        self.follow_playback_off();
        self.ensure_selected_visible();
    }

    /// Leave filter mode keeping the query applied.
    pub fn exit_filter_mode(&mut self) {
        self.filter_mode = false;
    }

    /// Clear the active filter and restore selection visibility.
    pub fn clear_filter(&mut self) {
        self.filter_query.clear();
        self.filter_mode = false;
        self.ensure_selected_visible();
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter_query.push(c);
        self.ensure_selected_visible();
    }

    pub fn pop_filter_char(&mut self) {
        self.filter_query.pop();
        self.ensure_selected_visible();
    }

    /// Ensure that `selected` is part of the current filtered view,
    /// otherwise move selection to the first visible track.
    fn ensure_selected_visible(&mut self) {
        let display = self.display_indices();
        if display.is_empty() {
            self.selected = 0;
            return;
        }

        if !display.contains(&self.selected) {
            self.selected = display[0];
        }
    }
}
