//! Audio subsystem: the media-resource seam and its rodio implementation.
//!
//! `AudioPlayer` owns a dedicated audio thread. Commands go in over a channel
//! and the thread answers with `MediaEvent`s tagged by binding.

mod player;
mod resource;
mod sink;
mod thread;
mod types;

pub use player::AudioPlayer;
pub use resource::MediaResource;
pub use types::{BindingId, MediaEvent};

#[cfg(test)]
pub(crate) mod fake;
