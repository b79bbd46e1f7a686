//! Settings for the player, the local store and logging.
//!
//! Loaded from an optional TOML file and `INDIESOUND__` environment
//! variables on top of struct defaults.

mod load;
mod schema;

pub use schema::*;
