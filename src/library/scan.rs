use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::prelude::Accessor;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

/// What the tags of one audio file say about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub genre: Option<String>,
    pub duration: Option<Duration>,
}

pub(super) fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn non_blank(v: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Read title, artist, genre and length from tags, falling back to the file
/// stem for the title when the file has no usable tags.
pub fn read_tags(path: &Path) -> ScannedFile {
    let mut scanned = ScannedFile {
        path: path.to_path_buf(),
        title: path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string(),
        artist: None,
        genre: None,
        duration: None,
    };

    if let Ok(tagged) = lofty::read_from_path(path) {
        let duration = tagged.properties().duration();
        scanned.duration = (!duration.is_zero()).then_some(duration);

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            if let Some(title) = non_blank(tag.title()) {
                scanned.title = title;
            }
            scanned.artist = non_blank(tag.artist());
            scanned.genre = non_blank(tag.genre());
        }
    }

    scanned
}

/// Walk `dir` for audio files according to `settings`, sorted by path.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<ScannedFile> {
    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    let mut files: Vec<ScannedFile> = walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file() && is_audio_file(e.path(), settings))
        .map(|e| read_tags(e.path()))
        .collect();

    files.sort_by(|a, b| a.path.cmp(&b.path));
    files
}
