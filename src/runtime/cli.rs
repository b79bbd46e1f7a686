use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::library::UploadRequest;
use crate::store::TrackUpdate;

/// Terminal player and catalog tool for IndieSound. Without a command it
/// opens the player on the whole catalog.
#[derive(Debug, Parser)]
#[command(name = "indiesound", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, PartialEq, Subcommand)]
pub enum Command {
    /// List catalog tracks
    List {
        /// Only tracks whose title or artist contains this text
        query: Option<String>,
        /// Only tracks uploaded under this artist
        #[arg(long)]
        artist: Option<String>,
        /// Sort by title instead of newest first
        #[arg(long)]
        by_title: bool,
    },
    /// Upload every audio file under a directory
    Import {
        dir: PathBuf,
        /// Artist for files without an artist tag
        #[arg(long, env = "INDIESOUND_ARTIST", default_value = "Unknown Artist")]
        artist: String,
    },
    /// Upload one audio file
    Upload(UploadArgs),
    /// Change a track's title, artist or genre
    Edit(EditArgs),
    /// Delete a track and its files
    Remove { id: u64 },
    /// Create, fill and play playlists
    #[command(subcommand)]
    Playlist(PlaylistCommand),
}

#[derive(Debug, PartialEq, Args)]
pub struct UploadArgs {
    pub file: PathBuf,
    #[arg(long, env = "INDIESOUND_ARTIST")]
    pub artist: String,
    /// Defaults to the title tag, then the file name
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub genre: Option<String>,
    /// Cover image to upload alongside
    #[arg(long)]
    pub cover: Option<PathBuf>,
}

impl From<UploadArgs> for UploadRequest {
    fn from(args: UploadArgs) -> Self {
        UploadRequest {
            audio: args.file,
            cover: args.cover,
            title: args.title,
            artist: args.artist,
            genre: args.genre,
        }
    }
}

#[derive(Debug, PartialEq, Args)]
pub struct EditArgs {
    pub id: u64,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub artist: Option<String>,
    /// An empty value clears the genre
    #[arg(long)]
    pub genre: Option<String>,
}

impl From<EditArgs> for TrackUpdate {
    fn from(args: EditArgs) -> Self {
        TrackUpdate {
            title: args.title,
            artist: args.artist,
            genre: args.genre.map(Some),
        }
    }
}

#[derive(Debug, PartialEq, Subcommand)]
pub enum PlaylistCommand {
    /// Create an empty playlist
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Local image to upload, or an image URL
        #[arg(long)]
        cover: Option<String>,
    },
    /// List playlists, newest first
    List,
    /// Show a playlist's tracks in order
    Show { id: u64 },
    /// Append tracks to a playlist
    Add {
        id: u64,
        #[arg(required = true)]
        tracks: Vec<u64>,
    },
    /// Take a track out of a playlist
    Drop { id: u64, track: u64 },
    /// Delete a playlist (its tracks stay in the catalog)
    Delete { id: u64 },
    /// Open the player on a playlist and start playing it
    Play { id: u64 },
}

impl Cli {
    /// Whether this invocation runs the full-screen player.
    pub fn opens_player(&self) -> bool {
        matches!(
            self.command,
            None | Some(Command::Playlist(PlaylistCommand::Play { .. }))
        )
    }
}
