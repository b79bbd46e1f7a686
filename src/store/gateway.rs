use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Object storage buckets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// Audio files.
    Tracks,
    /// Cover images.
    Covers,
    /// Playlist cover images.
    PlaylistCovers,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Tracks, Bucket::Covers, Bucket::PlaylistCovers];

    pub fn name(self) -> &'static str {
        match self {
            Bucket::Tracks => "tracks",
            Bucket::Covers => "covers",
            Bucket::PlaylistCovers => "playlist-covers",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A stored row of the `tracks` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub id: u64,
    pub title: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u64>,
    /// Stored object path (or a full URL written by another client) in `tracks`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_path: Option<String>,
    /// Stored object path (or a full URL) in `covers`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_path: Option<String>,
    /// Unix seconds.
    pub created_at: u64,
}

/// Values for a row about to be inserted. Ids and timestamps are assigned by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTrack {
    pub title: String,
    pub artist: String,
    pub artist_id: Option<String>,
    pub genre: Option<String>,
    pub duration_secs: Option<u64>,
    pub audio_path: Option<String>,
    pub cover_path: Option<String>,
}

/// Partial update; `None` leaves a column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackUpdate {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub genre: Option<Option<String>>,
}

/// A stored row of the `playlists` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistRecord {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Stored object path in `playlist-covers`, or a full image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_path: Option<String>,
    /// Member track ids in play order.
    #[serde(default)]
    pub track_ids: Vec<u64>,
    /// Unix seconds.
    pub created_at: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPlaylist {
    pub name: String,
    pub description: Option<String>,
    pub cover_path: Option<String>,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum TrackOrder {
    /// `created_at` descending, ties broken by id descending.
    #[default]
    NewestFirst,
    /// Case-insensitive title, then artist.
    Title,
}

/// Filter and sort for `Gateway::list_tracks`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackQuery {
    /// Case-insensitive substring matched against title or artist.
    pub search: Option<String>,
    pub artist_id: Option<String>,
    pub order: TrackOrder,
}

impl TrackQuery {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }

    pub fn for_artist(mut self, artist_id: impl Into<String>) -> Self {
        self.artist_id = Some(artist_id.into());
        self
    }

    pub fn ordered(mut self, order: TrackOrder) -> Self {
        self.order = order;
        self
    }

    /// Whether `record` passes the filter part of this query.
    pub fn matches(&self, record: &TrackRecord) -> bool {
        if let Some(artist_id) = &self.artist_id {
            if record.artist_id.as_deref() != Some(artist_id.as_str()) {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                record.title.to_lowercase().contains(&term)
                    || record.artist.to_lowercase().contains(&term)
            }
        }
    }

    /// Sort `records` in place according to `order`.
    pub fn sort(&self, records: &mut [TrackRecord]) {
        match self.order {
            TrackOrder::NewestFirst => {
                records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)))
            }
            TrackOrder::Title => records.sort_by(|a, b| {
                a.title
                    .to_lowercase()
                    .cmp(&b.title.to_lowercase())
                    .then_with(|| a.artist.to_lowercase().cmp(&b.artist.to_lowercase()))
            }),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read catalog: {0}")]
    Decode(#[from] toml::de::Error),

    #[error("failed to write catalog: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("track {0} not found")]
    NotFound(u64),

    #[error("playlist {0} not found")]
    PlaylistNotFound(u64),

    #[error("invalid object path: {0}")]
    InvalidPath(String),
}

/// Request/response contract of the catalog and object storage backend.
///
/// Presentation code calls this directly; the playback queue never does.
pub trait Gateway {
    /// List track rows matching `query`, sorted by `query.order`.
    fn list_tracks(&self, query: &TrackQuery) -> Result<Vec<TrackRecord>, StoreError>;

    fn get_track(&self, id: u64) -> Result<TrackRecord, StoreError>;

    fn insert_track(&mut self, track: NewTrack) -> Result<TrackRecord, StoreError>;

    fn update_track(&mut self, id: u64, update: TrackUpdate) -> Result<TrackRecord, StoreError>;

    /// Delete a track row. The track also leaves every playlist holding it.
    fn delete_track(&mut self, id: u64) -> Result<(), StoreError>;

    /// All playlists, newest first.
    fn list_playlists(&self) -> Result<Vec<PlaylistRecord>, StoreError>;

    fn get_playlist(&self, id: u64) -> Result<PlaylistRecord, StoreError>;

    fn insert_playlist(&mut self, playlist: NewPlaylist) -> Result<PlaylistRecord, StoreError>;

    fn delete_playlist(&mut self, id: u64) -> Result<(), StoreError>;

    /// Append `track_id` to a playlist. Adding a member twice is a no-op.
    fn add_playlist_track(
        &mut self,
        playlist_id: u64,
        track_id: u64,
    ) -> Result<PlaylistRecord, StoreError>;

    /// Drop `track_id` from a playlist; absent members are ignored.
    fn remove_playlist_track(
        &mut self,
        playlist_id: u64,
        track_id: u64,
    ) -> Result<PlaylistRecord, StoreError>;

    /// Member rows of a playlist in play order.
    fn playlist_tracks(&self, playlist_id: u64) -> Result<Vec<TrackRecord>, StoreError>;

    /// Store `bytes` under `path` in `bucket` (overwriting) and return the stored path.
    fn upload(&mut self, bucket: Bucket, path: &str, bytes: &[u8]) -> Result<String, StoreError>;

    /// Remove stored objects. Paths that do not exist are ignored.
    fn remove(&mut self, bucket: Bucket, paths: &[String]) -> Result<(), StoreError>;

    /// Resolve a stored path to a URL the audio device (or a browser) can fetch.
    fn public_url(&self, bucket: Bucket, path: &str) -> String;
}
