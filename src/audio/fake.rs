//! In-memory `MediaResource` for controller tests.

use std::collections::VecDeque;
use std::time::Duration;

use crate::library::{PlayableUrl, UrlId};

use super::resource::MediaResource;
use super::types::{BindingId, MediaEvent};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    SetSource(UrlId),
    ClearSource,
    Play,
    Pause,
    Seek(Duration),
    SetVolume(f32),
    Shutdown,
}

#[derive(Default)]
pub(crate) struct FakeResource {
    pub calls: Vec<Call>,
    pub events: VecDeque<MediaEvent>,
    pub bound: Option<BindingId>,
    pub position: Duration,
    pub volume: f32,
    next_binding: u64,
}

impl FakeResource {
    pub fn new() -> Self {
        Self {
            volume: 1.0,
            ..Self::default()
        }
    }

    /// Queue a signal as if the engine had emitted it.
    pub fn emit(&mut self, event: MediaEvent) {
        self.events.push_back(event);
    }

    pub fn metadata_ready(&mut self, seconds: f64) {
        if let Some(binding) = self.bound {
            self.emit(MediaEvent::MetadataReady {
                binding,
                duration: Duration::from_secs_f64(seconds),
            });
        }
    }

    pub fn finished(&mut self) {
        if let Some(binding) = self.bound {
            self.emit(MediaEvent::Finished { binding });
        }
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }
}

impl MediaResource for FakeResource {
    fn set_source(&mut self, url: &PlayableUrl) -> BindingId {
        self.next_binding += 1;
        let binding = BindingId(self.next_binding);
        self.bound = Some(binding);
        self.position = Duration::ZERO;
        self.calls.push(Call::SetSource(url.id()));
        binding
    }

    fn clear_source(&mut self) {
        self.bound = None;
        self.calls.push(Call::ClearSource);
    }

    fn play(&mut self) {
        self.calls.push(Call::Play);
    }

    fn pause(&mut self) {
        self.calls.push(Call::Pause);
    }

    fn current_time(&self) -> Duration {
        self.position
    }

    fn set_current_time(&mut self, position: Duration) {
        self.position = position;
        self.calls.push(Call::Seek(position));
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        self.calls.push(Call::SetVolume(volume));
    }

    fn poll_event(&mut self) -> Option<MediaEvent> {
        self.events.pop_front()
    }

    fn shutdown(&mut self, _fade_out: Duration) {
        self.bound = None;
        self.calls.push(Call::Shutdown);
    }
}
