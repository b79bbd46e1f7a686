//! Application module: the app model used by the TUI and the key commands
//! that drive it and the playback queue.

mod command;
mod model;

pub use command::{Command, Effect, apply, command_for_key, play_all};
pub use model::*;

#[cfg(test)]
mod tests;
