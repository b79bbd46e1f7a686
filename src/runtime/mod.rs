use std::time::Duration;

use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use log::{LevelFilter, info, warn};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{self, App};
use crate::audio::{AudioPlayer, Coordinator, VolumeStore};
use crate::config::Settings;
use crate::library::{
    self, CatalogEntry, PlaylistRequest, artist_slug, create_playlist, edit_track,
    format_duration, import_dir, load_catalog, load_playlist_entries, load_playlists,
    remove_playlist, remove_track, upload_track,
};
use crate::store::{Gateway, LocalStore, TrackOrder, TrackQuery};

mod cli;
mod event_loop;
mod logging;
mod settings;

use cli::{Cli, Command, PlaylistCommand};

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = settings::load_settings();
    let level = settings.log_level().unwrap_or(LevelFilter::Info);

    if cli.opens_player() {
        match settings.log_file() {
            Some(path) => {
                if let Err(e) = logging::init_file(&path, level) {
                    eprintln!("indiesound: cannot log to {}: {e}", path.display());
                }
            }
            None => eprintln!("indiesound: no log file location; logging disabled"),
        }
    } else {
        logging::init_stderr(level);
    }
    logging::install_panic_hook();

    let root = settings
        .store_root()
        .ok_or("cannot locate a data directory; set store.root")?;
    let mut store = LocalStore::open(&root, settings.store.public_base_url.clone())?;

    let Some(command) = cli.command else {
        return run_tui(&settings, &store, None);
    };

    match command {
        Command::List {
            query: text,
            artist,
            by_title,
        } => {
            let mut query = text.map(TrackQuery::search).unwrap_or_default();
            if let Some(name) = artist {
                query = query.for_artist(artist_slug(&name));
            }
            if by_title {
                query = query.ordered(TrackOrder::Title);
            }
            print_entries(&load_catalog(&store, &query)?);
        }
        Command::Import { dir, artist } => {
            let report = import_dir(&mut store, &dir, &artist, &settings.library);
            info!(
                "imported {} tracks from {} ({} skipped)",
                report.imported,
                dir.display(),
                report.skipped
            );
        }
        Command::Upload(args) => {
            let record = upload_track(&mut store, args.into())?;
            println!("{}", record.id);
        }
        Command::Edit(args) => {
            let id = args.id;
            let record = edit_track(&mut store, id, args.into())?;
            println!(
                "{:>5}  {} - {}  [{}]",
                record.id,
                record.artist,
                record.title,
                record.genre.as_deref().unwrap_or("-")
            );
        }
        Command::Remove { id } => remove_track(&mut store, id)?,
        Command::Playlist(cmd) => run_playlist_command(&settings, &mut store, cmd)?,
    }
    Ok(())
}

fn run_playlist_command(
    settings: &Settings,
    store: &mut LocalStore,
    cmd: PlaylistCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        PlaylistCommand::Create {
            name,
            description,
            cover,
        } => {
            let record = create_playlist(
                store,
                PlaylistRequest {
                    name,
                    description,
                    cover,
                },
            )?;
            println!("{}", record.id);
        }
        PlaylistCommand::List => {
            for playlist in load_playlists(store)? {
                let description = playlist
                    .description
                    .map(|d| format!("  {d}"))
                    .unwrap_or_default();
                println!(
                    "{:>5}  {} ({} tracks){description}",
                    playlist.id, playlist.name, playlist.track_count
                );
                if let Some(url) = &playlist.cover_url {
                    println!("       cover: {url}");
                }
            }
        }
        PlaylistCommand::Show { id } => {
            let playlist = store.get_playlist(id)?;
            println!("{}", playlist.name);
            if let Some(description) = &playlist.description {
                println!("{description}");
            }
            print_entries(&load_playlist_entries(store, id)?);
        }
        PlaylistCommand::Add { id, tracks } => {
            for track in tracks {
                store.add_playlist_track(id, track)?;
            }
        }
        PlaylistCommand::Drop { id, track } => {
            store.remove_playlist_track(id, track)?;
        }
        PlaylistCommand::Delete { id } => remove_playlist(store, id)?,
        PlaylistCommand::Play { id } => run_tui(settings, store, Some(id))?,
    }
    Ok(())
}

fn print_entries(entries: &[CatalogEntry]) {
    for entry in entries {
        let genre = entry
            .genre
            .as_deref()
            .map(|g| format!("  ({g})"))
            .unwrap_or_default();
        println!(
            "{:>5}  {}  [{}]{genre}",
            entry.id,
            library::display_line(&entry.track),
            format_duration(entry.duration)
        );
    }
}

/// Run the player on the whole catalog, or on one playlist which then
/// starts playing from its first track.
fn run_tui(
    settings: &Settings,
    store: &LocalStore,
    playlist: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let entries = match playlist {
        Some(id) => {
            let name = store.get_playlist(id)?.name;
            let entries = load_playlist_entries(store, id)?;
            info!("loaded playlist {id} ({name}, {} tracks)", entries.len());
            entries
        }
        None => {
            let entries = load_catalog(store, &TrackQuery::default())?;
            info!("loaded {} catalog entries", entries.len());
            entries
        }
    };

    let volume_store = match settings.state_path() {
        Some(path) => VolumeStore::new(path),
        None => {
            warn!("no state directory; volume will not be remembered");
            VolumeStore::in_memory()
        }
    };
    let audio_player = AudioPlayer::new(volume_store, Duration::from_millis(settings.audio.tick_ms))?;

    let mut coordinator = Coordinator::new();
    let snapshots = coordinator.subscribe();
    let mut app = App::new(entries);
    if playlist.is_some() {
        app::play_all(&mut app, &mut coordinator);
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(
        &mut terminal,
        settings,
        &mut app,
        &mut coordinator,
        &snapshots,
        &audio_player,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
