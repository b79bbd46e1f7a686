use std::time::Duration;

use crate::store::{Bucket, Gateway, StoreError, TrackQuery, TrackRecord, object_path};

use super::model::{CatalogEntry, Track};

/// Turn a stored column value into a fetchable URL.
///
/// Paths in `bucket` go through the gateway; URLs that point elsewhere are
/// used as they are.
pub(super) fn resolve_url<G: Gateway + ?Sized>(
    gateway: &G,
    bucket: Bucket,
    value: Option<&str>,
) -> Option<String> {
    let value = value?.trim();
    match object_path(bucket, value) {
        Some(path) => Some(gateway.public_url(bucket, &path)),
        None if value.contains("://") => Some(value.to_string()),
        None => None,
    }
}

/// Resolve a stored row into something the playback queue can use.
pub fn entry_from_record<G: Gateway + ?Sized>(record: &TrackRecord, gateway: &G) -> CatalogEntry {
    CatalogEntry {
        id: record.id,
        track: Track {
            title: record.title.clone(),
            artist: record.artist.clone(),
            cover_url: resolve_url(gateway, Bucket::Covers, record.cover_path.as_deref()),
            audio_url: resolve_url(gateway, Bucket::Tracks, record.audio_path.as_deref()),
        },
        duration: record.duration_secs.map(Duration::from_secs),
        genre: record.genre.clone(),
    }
}

pub fn load_catalog<G: Gateway + ?Sized>(
    gateway: &G,
    query: &TrackQuery,
) -> Result<Vec<CatalogEntry>, StoreError> {
    Ok(gateway
        .list_tracks(query)?
        .iter()
        .map(|r| entry_from_record(r, gateway))
        .collect())
}
