use std::time::Duration;

use crate::library::PlayableUrl;

use super::types::{BindingId, MediaEvent};

/// The media engine the playback controller drives.
///
/// Implementations never decode on the caller's thread: `set_source` starts a
/// load and the outcome arrives later through `poll_event`. Every call to
/// `set_source` ends the previous binding; events for it must not be
/// delivered afterwards.
pub trait MediaResource {
    /// Bind `url` as the new source and return the binding's id.
    fn set_source(&mut self, url: &PlayableUrl) -> BindingId;
    /// Drop the current binding, going idle.
    fn clear_source(&mut self);
    fn play(&mut self);
    fn pause(&mut self);
    fn current_time(&self) -> Duration;
    fn set_current_time(&mut self, position: Duration);
    fn volume(&self) -> f32;
    fn set_volume(&mut self, volume: f32);
    /// Next pending signal for the live binding, if any.
    fn poll_event(&mut self) -> Option<MediaEvent>;

    /// Release the engine. Called once on teardown.
    fn shutdown(&mut self, _fade_out: Duration) {
        self.clear_source();
    }
}
