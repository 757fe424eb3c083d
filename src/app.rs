//! Application module: the playback controller and the model it keeps.
//!
//! `PlaybackController` lives in `app::controller`; the playlist, playback
//! state and TUI cursor state live in `app::model`.

mod controller;
mod model;

pub use controller::PlaybackController;
pub use model::*;

#[cfg(test)]
mod tests;
