// Library entry for the playback coordination core.
// The demo binary in src/main.rs wires in-memory services against this.

pub mod config;
pub mod constants;
pub mod models;
pub mod playback;
pub mod player;
pub mod services;
pub mod utils;
