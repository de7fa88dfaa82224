//! cinedash: a terminal client for a movie catalog server.
//!
//! The library holds everything the binary and the integration tests share:
//! the HTTP client, the infinite-scroll feed, configuration and session
//! storage, the TUI and the non-interactive subcommands.

pub mod api;
pub mod app;
pub mod commands;
pub mod config;
pub mod feed;
pub mod session;
pub mod ui;
pub mod util;
