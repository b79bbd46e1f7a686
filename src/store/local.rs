use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::gateway::{
    Bucket, Gateway, NewPlaylist, NewTrack, PlaylistRecord, StoreError, TrackQuery, TrackRecord,
    TrackUpdate,
};
use super::paths::{hosted_public_url, is_safe_relative};

const CATALOG_FILE: &str = "catalog.toml";

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct Catalog {
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    next_playlist_id: u64,
    #[serde(default)]
    tracks: Vec<TrackRecord>,
    #[serde(default)]
    playlists: Vec<PlaylistRecord>,
}

/// Next id above both the counter and every id in use.
fn allocate(next: &mut u64, used: impl Iterator<Item = u64>) -> u64 {
    let id = (*next).max(used.max().unwrap_or(0) + 1);
    *next = id + 1;
    id
}

impl Catalog {
    fn allocate_id(&mut self) -> u64 {
        allocate(&mut self.next_id, self.tracks.iter().map(|t| t.id))
    }

    fn allocate_playlist_id(&mut self) -> u64 {
        allocate(
            &mut self.next_playlist_id,
            self.playlists.iter().map(|p| p.id),
        )
    }

    fn track_position(&self, id: u64) -> Result<usize, StoreError> {
        self.tracks
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    fn playlist_position(&self, id: u64) -> Result<usize, StoreError> {
        self.playlists
            .iter()
            .position(|p| p.id == id)
            .ok_or(StoreError::PlaylistNotFound(id))
    }

    fn playlist_mut(&mut self, id: u64) -> Result<&mut PlaylistRecord, StoreError> {
        let pos = self.playlist_position(id)?;
        Ok(&mut self.playlists[pos])
    }
}

/// Filesystem gateway.
///
/// Layout under `root`:
///
/// ```text
/// catalog.toml        rows of the tracks and playlists tables
/// tracks/...          audio objects
/// covers/...          cover objects
/// playlist-covers/... playlist cover objects
/// ```
///
/// Every mutation rewrites `catalog.toml` through a temporary file. The
/// in-memory catalog only changes once that write succeeded.
pub struct LocalStore {
    root: PathBuf,
    public_base_url: Option<String>,
    catalog: Catalog,
}

impl LocalStore {
    /// Open (or initialise) a store rooted at `root`.
    pub fn open(root: &Path, public_base_url: Option<String>) -> Result<Self, StoreError> {
        let root = std::path::absolute(root)?;
        for bucket in Bucket::ALL {
            fs::create_dir_all(root.join(bucket.name()))?;
        }

        let catalog_path = root.join(CATALOG_FILE);
        let catalog: Catalog = match fs::read_to_string(&catalog_path) {
            Ok(text) => toml::from_str(&text)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Catalog::default(),
            Err(e) => return Err(e.into()),
        };

        info!(
            "opened store at {} ({} tracks, {} playlists)",
            root.display(),
            catalog.tracks.len(),
            catalog.playlists.len()
        );

        Ok(Self {
            root,
            public_base_url: public_base_url.filter(|u| !u.trim().is_empty()),
            catalog,
        })
    }

    #[cfg(test)]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_file(&self, bucket: Bucket, path: &str) -> Result<PathBuf, StoreError> {
        if !is_safe_relative(path) {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(bucket.name()).join(path))
    }

    fn persist(&self, catalog: &Catalog) -> Result<(), StoreError> {
        let text = toml::to_string(catalog)?;
        let target = self.root.join(CATALOG_FILE);
        let tmp = self.root.join(format!("{CATALOG_FILE}.tmp"));
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &target)?;
        Ok(())
    }

    /// Apply `change` to a copy of the catalog, write it, then swap it in.
    fn commit<T>(
        &mut self,
        change: impl FnOnce(&mut Catalog) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut next = self.catalog.clone();
        let out = change(&mut next)?;
        self.persist(&next)?;
        self.catalog = next;
        Ok(out)
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl Gateway for LocalStore {
    fn list_tracks(&self, query: &TrackQuery) -> Result<Vec<TrackRecord>, StoreError> {
        let mut rows: Vec<TrackRecord> = self
            .catalog
            .tracks
            .iter()
            .filter(|t| query.matches(t))
            .cloned()
            .collect();
        query.sort(&mut rows);
        Ok(rows)
    }

    fn get_track(&self, id: u64) -> Result<TrackRecord, StoreError> {
        let pos = self.catalog.track_position(id)?;
        Ok(self.catalog.tracks[pos].clone())
    }

    fn insert_track(&mut self, track: NewTrack) -> Result<TrackRecord, StoreError> {
        let record = self.commit(|catalog| {
            let record = TrackRecord {
                id: catalog.allocate_id(),
                title: track.title,
                artist: track.artist,
                artist_id: track.artist_id,
                genre: track.genre,
                duration_secs: track.duration_secs,
                audio_path: track.audio_path,
                cover_path: track.cover_path,
                created_at: now_unix(),
            };
            catalog.tracks.push(record.clone());
            Ok(record)
        })?;
        debug!("inserted track {} ({})", record.id, record.title);
        Ok(record)
    }

    fn update_track(&mut self, id: u64, update: TrackUpdate) -> Result<TrackRecord, StoreError> {
        self.commit(|catalog| {
            let pos = catalog.track_position(id)?;
            let record = &mut catalog.tracks[pos];
            if let Some(title) = update.title {
                record.title = title;
            }
            if let Some(artist) = update.artist {
                record.artist = artist;
            }
            if let Some(genre) = update.genre {
                record.genre = genre;
            }
            Ok(record.clone())
        })
    }

    fn delete_track(&mut self, id: u64) -> Result<(), StoreError> {
        self.commit(|catalog| {
            let pos = catalog.track_position(id)?;
            catalog.tracks.remove(pos);
            for playlist in &mut catalog.playlists {
                playlist.track_ids.retain(|&t| t != id);
            }
            Ok(())
        })?;
        debug!("deleted track {id}");
        Ok(())
    }

    fn list_playlists(&self) -> Result<Vec<PlaylistRecord>, StoreError> {
        let mut rows = self.catalog.playlists.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    fn get_playlist(&self, id: u64) -> Result<PlaylistRecord, StoreError> {
        let pos = self.catalog.playlist_position(id)?;
        Ok(self.catalog.playlists[pos].clone())
    }

    fn insert_playlist(&mut self, playlist: NewPlaylist) -> Result<PlaylistRecord, StoreError> {
        let record = self.commit(|catalog| {
            let record = PlaylistRecord {
                id: catalog.allocate_playlist_id(),
                name: playlist.name,
                description: playlist.description,
                cover_path: playlist.cover_path,
                track_ids: Vec::new(),
                created_at: now_unix(),
            };
            catalog.playlists.push(record.clone());
            Ok(record)
        })?;
        debug!("inserted playlist {} ({})", record.id, record.name);
        Ok(record)
    }

    fn delete_playlist(&mut self, id: u64) -> Result<(), StoreError> {
        self.commit(|catalog| {
            let pos = catalog.playlist_position(id)?;
            catalog.playlists.remove(pos);
            Ok(())
        })?;
        debug!("deleted playlist {id}");
        Ok(())
    }

    fn add_playlist_track(
        &mut self,
        playlist_id: u64,
        track_id: u64,
    ) -> Result<PlaylistRecord, StoreError> {
        self.commit(|catalog| {
            catalog.track_position(track_id)?;
            let playlist = catalog.playlist_mut(playlist_id)?;
            if !playlist.track_ids.contains(&track_id) {
                playlist.track_ids.push(track_id);
            }
            Ok(playlist.clone())
        })
    }

    fn remove_playlist_track(
        &mut self,
        playlist_id: u64,
        track_id: u64,
    ) -> Result<PlaylistRecord, StoreError> {
        self.commit(|catalog| {
            let playlist = catalog.playlist_mut(playlist_id)?;
            playlist.track_ids.retain(|&t| t != track_id);
            Ok(playlist.clone())
        })
    }

    fn playlist_tracks(&self, playlist_id: u64) -> Result<Vec<TrackRecord>, StoreError> {
        let playlist = &self.catalog.playlists[self.catalog.playlist_position(playlist_id)?];
        Ok(playlist
            .track_ids
            .iter()
            .filter_map(|&id| self.catalog.tracks.iter().find(|t| t.id == id))
            .cloned()
            .collect())
    }

    fn upload(&mut self, bucket: Bucket, path: &str, bytes: &[u8]) -> Result<String, StoreError> {
        let file = self.object_file(bucket, path)?;
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file, bytes)?;
        debug!("stored {} bytes at {bucket}/{path}", bytes.len());
        Ok(path.to_string())
    }

    fn remove(&mut self, bucket: Bucket, paths: &[String]) -> Result<(), StoreError> {
        for path in paths {
            let file = self.object_file(bucket, path)?;
            match fs::remove_file(&file) {
                Ok(()) => debug!("removed {bucket}/{path}"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn public_url(&self, bucket: Bucket, path: &str) -> String {
        match &self.public_base_url {
            Some(base) => hosted_public_url(base, bucket, path),
            None => format!(
                "file://{}",
                self.root.join(bucket.name()).join(path).display()
            ),
        }
    }
}
