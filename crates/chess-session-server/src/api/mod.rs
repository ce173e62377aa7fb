//! Tool handlers.

pub mod game;
