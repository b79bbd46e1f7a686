use std::time::Duration;

/// A playable track as handed to the playback queue.
///
/// URLs are already resolved to something the audio device can open; `None`
/// means the catalog row has no stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub cover_url: Option<String>,
    pub audio_url: Option<String>,
}

impl Track {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            cover_url: None,
            audio_url: None,
        }
    }

    pub fn with_audio_url(mut self, url: impl Into<String>) -> Self {
        self.audio_url = Some(url.into());
        self
    }

    /// Queue identity: two tracks are the same entry when title and artist match.
    ///
    /// There is no stable id at this layer, so distinct uploads sharing a title
    /// and artist collapse into one entry.
    pub fn same_entry(&self, other: &Track) -> bool {
        self.title == other.title && self.artist == other.artist
    }

    /// The resolved audio URL, used by the output binding to detect source changes.
    pub fn source(&self) -> Option<&str> {
        self.audio_url.as_deref()
    }
}

/// One row of the browsable catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: u64,
    pub track: Track,
    pub duration: Option<Duration>,
    pub genre: Option<String>,
}
