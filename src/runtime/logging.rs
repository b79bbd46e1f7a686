use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

use env_logger::Target;
use log::LevelFilter;

/// Colored logging on stderr, for the one-shot subcommands.
pub fn init_stderr(level: LevelFilter) {
    let mut clog = colog::default_builder();
    clog.filter(None, level);
    let _ = clog.try_init();
}

/// Append plain log lines to `path`. Used while the TUI owns the terminal.
pub fn init_file(path: &Path, level: LevelFilter) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let _ = env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp_millis()
        .target(Target::Pipe(Box::new(file)))
        .try_init();
    Ok(())
}

/// Log panics from any thread before the default hook prints them.
pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let current_thread = std::thread::current();
        let thread_name = current_thread.name().unwrap_or("unnamed");
        log::error!("panic in thread '{}': {}", thread_name, panic_info);
        default_hook(panic_info);
    }));
}
