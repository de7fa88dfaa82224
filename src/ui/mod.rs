//! Terminal User Interface module.
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling for browse and search modes
//! - `events` - Background task event processing
//! - `render` - Layout of the browse view
//! - `helpers` - Spawning page and genre loads
//! - `filter_bar`, `movies`, `status`, `help` - Widgets

mod events;
mod filter_bar;
mod help;
mod helpers;
mod input;
mod loop_runner;
mod movies;
mod render;
mod status;

pub use loop_runner::{run, Action};
