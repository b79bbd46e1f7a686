//! Library: the `Track` value handed to playback, the browsable catalog
//! built from gateway rows, playlists, and the upload/import/remove flows.

mod catalog;
mod display;
mod model;
mod playlist;
mod scan;
mod upload;

pub use catalog::{entry_from_record, load_catalog};
pub use display::{display_line, format_clock, format_duration};
pub use model::{CatalogEntry, Track};
pub use playlist::{
    PlaylistRequest, PlaylistSummary, create_playlist, load_playlist_entries, load_playlists,
    remove_playlist,
};
pub use upload::{
    ImportReport, LibraryError, UploadRequest, artist_slug, edit_track, import_dir, remove_track,
    upload_track,
};
