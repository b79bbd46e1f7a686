//! Playlists as the presentation side sees them: creation with an optional
//! cover, summaries for listing, and the member tracks as a playable queue.

use std::path::Path;

use log::info;

use crate::store::{Bucket, Gateway, NewPlaylist, PlaylistRecord, StoreError, object_path};

use super::catalog::{entry_from_record, resolve_url};
use super::model::CatalogEntry;
use super::upload::{LibraryError, discard, store_file};

/// Folder inside `playlist-covers` for covers uploaded from this client.
const COVER_FOLDER: &str = "playlists";

#[derive(Debug, Clone, Default)]
pub struct PlaylistRequest {
    pub name: String,
    pub description: Option<String>,
    /// A local image to upload, or an image URL to keep as is.
    pub cover: Option<String>,
}

/// One row of the playlist listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSummary {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub track_count: usize,
}

fn summary_from_record<G: Gateway + ?Sized>(
    record: &PlaylistRecord,
    gateway: &G,
) -> PlaylistSummary {
    PlaylistSummary {
        id: record.id,
        name: record.name.clone(),
        description: record.description.clone(),
        cover_url: resolve_url(gateway, Bucket::PlaylistCovers, record.cover_path.as_deref()),
        track_count: record.track_ids.len(),
    }
}

pub fn create_playlist<G: Gateway + ?Sized>(
    gateway: &mut G,
    request: PlaylistRequest,
) -> Result<PlaylistRecord, LibraryError> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(LibraryError::Empty("playlist name"));
    }

    let (cover_path, uploaded) = match request.cover.as_deref().map(str::trim) {
        None | Some("") => (None, false),
        Some(url) if url.contains("://") => (Some(url.to_string()), false),
        Some(file) => {
            let path = store_file(gateway, Bucket::PlaylistCovers, COVER_FOLDER, Path::new(file))?;
            (Some(path), true)
        }
    };

    let inserted = gateway.insert_playlist(NewPlaylist {
        name,
        description: request
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        cover_path: cover_path.clone(),
    });
    let record = match inserted {
        Ok(record) => record,
        Err(e) => {
            if let (true, Some(path)) = (uploaded, &cover_path) {
                discard(gateway, Bucket::PlaylistCovers, path);
            }
            return Err(e.into());
        }
    };

    info!("created playlist {} ({})", record.id, record.name);
    Ok(record)
}

pub fn load_playlists<G: Gateway + ?Sized>(gateway: &G) -> Result<Vec<PlaylistSummary>, StoreError> {
    Ok(gateway
        .list_playlists()?
        .iter()
        .map(|r| summary_from_record(r, gateway))
        .collect())
}

/// Member rows of a playlist in play order. Played in list context, this
/// is the queue the coordinator receives.
pub fn load_playlist_entries<G: Gateway + ?Sized>(
    gateway: &G,
    playlist_id: u64,
) -> Result<Vec<CatalogEntry>, StoreError> {
    Ok(gateway
        .playlist_tracks(playlist_id)?
        .iter()
        .map(|r| entry_from_record(r, gateway))
        .collect())
}

/// Delete a playlist and the cover it owns. Member tracks are untouched.
pub fn remove_playlist<G: Gateway + ?Sized>(gateway: &mut G, id: u64) -> Result<(), LibraryError> {
    let record = gateway.get_playlist(id)?;
    if let Some(path) = record
        .cover_path
        .as_deref()
        .and_then(|v| object_path(Bucket::PlaylistCovers, v))
    {
        discard(gateway, Bucket::PlaylistCovers, &path);
    }

    gateway.delete_playlist(id)?;
    info!("removed playlist {id} ({})", record.name);
    Ok(())
}
