//! Text helpers for terminal rendering.
//!
//! - **Truncation**: Unicode-aware width truncation with an ellipsis
//! - **Sanitizing**: strip control characters and escape sequences from server text

mod text;

pub use text::{strip_control_chars, truncate_to_width};
