//! Falling-block puzzle engine with a terminal front end.
//!
//! The [`game`] module owns all state and rules; [`pieces`] holds the static
//! tetromino shape and color-id tables. The binary is a thin ratatui
//! presenter driving the engine through its command API.

pub mod game;
pub mod pieces;
