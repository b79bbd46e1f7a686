//! Catalog mutations that span rows and stored objects: uploading, editing,
//! importing and removing tracks.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{info, warn};
use thiserror::Error;

use crate::config::LibrarySettings;
use crate::store::{Bucket, Gateway, NewTrack, StoreError, TrackRecord, TrackUpdate, object_path};

use super::scan::{read_tags, scan};

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} has no file name")]
    NoFileName(PathBuf),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A local audio file (and optional cover) to publish under an artist.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub audio: PathBuf,
    pub cover: Option<PathBuf>,
    /// Overrides the title read from tags.
    pub title: Option<String>,
    pub artist: String,
    pub genre: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

/// Lowercase ASCII slug used as the artist's folder in the buckets.
pub fn artist_slug(name: &str) -> String {
    let mut slug = String::new();
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "unknown".to_string()
    } else {
        slug
    }
}

/// Millisecond timestamp, strictly increasing within the process so two
/// uploads of the same file name never share an object path.
fn next_stamp() -> u64 {
    static LAST: AtomicU64 = AtomicU64::new(0);
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let mut prev = LAST.load(Ordering::Relaxed);
    loop {
        let next = now.max(prev + 1);
        match LAST.compare_exchange_weak(prev, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => prev = actual,
        }
    }
}

pub(super) fn store_file<G: Gateway + ?Sized>(
    gateway: &mut G,
    bucket: Bucket,
    folder: &str,
    file: &Path,
) -> Result<String, LibraryError> {
    let name = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LibraryError::NoFileName(file.to_path_buf()))?;
    let bytes = fs::read(file).map_err(|source| LibraryError::Read {
        path: file.to_path_buf(),
        source,
    })?;

    let path = format!("{folder}/{}_{name}", next_stamp());
    Ok(gateway.upload(bucket, &path, &bytes)?)
}

/// Store the audio (and cover) objects, then insert the row pointing at them.
pub fn upload_track<G: Gateway + ?Sized>(
    gateway: &mut G,
    request: UploadRequest,
) -> Result<TrackRecord, LibraryError> {
    let tags = read_tags(&request.audio);
    let artist_id = artist_slug(&request.artist);

    let audio_path = store_file(gateway, Bucket::Tracks, &artist_id, &request.audio)?;
    let cover_path = match &request.cover {
        Some(cover) => match store_file(gateway, Bucket::Covers, &artist_id, cover) {
            Ok(path) => Some(path),
            Err(e) => {
                discard(gateway, Bucket::Tracks, &audio_path);
                return Err(e);
            }
        },
        None => None,
    };

    let inserted = gateway.insert_track(NewTrack {
        title: request.title.unwrap_or(tags.title),
        artist: request.artist,
        artist_id: Some(artist_id),
        genre: request.genre.or(tags.genre),
        duration_secs: tags.duration.map(|d| d.as_secs()),
        audio_path: Some(audio_path.clone()),
        cover_path: cover_path.clone(),
    });
    let record = match inserted {
        Ok(record) => record,
        Err(e) => {
            discard(gateway, Bucket::Tracks, &audio_path);
            if let Some(path) = &cover_path {
                discard(gateway, Bucket::Covers, path);
            }
            return Err(e.into());
        }
    };

    info!("uploaded track {} ({} - {})", record.id, record.artist, record.title);
    Ok(record)
}

/// Best-effort removal of an object no row points at.
pub(super) fn discard<G: Gateway + ?Sized>(gateway: &mut G, bucket: Bucket, path: &str) {
    if let Err(e) = gateway.remove(bucket, &[path.to_string()]) {
        warn!("could not clean up {bucket}/{path}: {e}");
    }
}

/// Rename or retag a track. Title and artist cannot be blanked; an empty
/// genre clears it.
pub fn edit_track<G: Gateway + ?Sized>(
    gateway: &mut G,
    id: u64,
    mut update: TrackUpdate,
) -> Result<TrackRecord, LibraryError> {
    for (field, value) in [("title", &mut update.title), ("artist", &mut update.artist)] {
        if let Some(v) = value {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                return Err(LibraryError::Empty(field));
            }
            *v = trimmed.to_string();
        }
    }
    if let Some(genre) = &mut update.genre {
        *genre = genre
            .take()
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty());
    }

    let record = gateway.update_track(id, update)?;
    info!("edited track {id} ({} - {})", record.artist, record.title);
    Ok(record)
}

/// Upload every audio file under `dir`. Files without an artist tag are
/// filed under `default_artist`. Per-file failures are logged and skipped.
pub fn import_dir<G: Gateway + ?Sized>(
    gateway: &mut G,
    dir: &Path,
    default_artist: &str,
    settings: &LibrarySettings,
) -> ImportReport {
    let mut report = ImportReport::default();

    for file in scan(dir, settings) {
        let request = UploadRequest {
            audio: file.path.clone(),
            cover: None,
            title: Some(file.title),
            artist: file.artist.unwrap_or_else(|| default_artist.to_string()),
            genre: file.genre,
        };
        match upload_track(gateway, request) {
            Ok(_) => report.imported += 1,
            Err(e) => {
                warn!("skipping {}: {e}", file.path.display());
                report.skipped += 1;
            }
        }
    }

    report
}

/// Delete a track row together with its stored audio and cover.
///
/// Object removal failures are logged and do not stop the row from being
/// deleted.
pub fn remove_track<G: Gateway + ?Sized>(gateway: &mut G, id: u64) -> Result<(), LibraryError> {
    let record = gateway.get_track(id)?;

    let objects = [
        (Bucket::Tracks, record.audio_path.as_deref()),
        (Bucket::Covers, record.cover_path.as_deref()),
    ];
    for (bucket, value) in objects {
        let Some(path) = value.and_then(|v| object_path(bucket, v)) else {
            continue;
        };
        if let Err(e) = gateway.remove(bucket, &[path.clone()]) {
            warn!("could not delete {bucket}/{path}: {e}");
        }
    }

    gateway.delete_track(id)?;
    info!("removed track {id} ({})", record.title);
    Ok(())
}
