//! Storage gateway: catalog rows plus object buckets.
//!
//! `Gateway` is the request/response contract the rest of the crate talks to.
//! `LocalStore` implements it on top of a directory so the player works
//! without a hosted backend.

mod gateway;
mod local;
mod paths;

pub use gateway::*;
pub use local::LocalStore;
pub use paths::object_path;

#[cfg(test)]
mod tests;
