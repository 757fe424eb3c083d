//! The playback state machine.
//!
//! `PlaybackController` owns the playlist and the playback state and is the
//! only thing that talks to the media resource. User commands come in as
//! method calls; resource signals and finished duration probes are drained by
//! [`PlaybackController::pump`] from the event loop.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::audio::{BindingId, MediaEvent, MediaResource};
use crate::library::{FileBlob, ProbeOutcome, Track, UrlRegistry, display_name, spawn_probe};

use super::model::{PlaybackState, Playlist, ResourceStatus, Transport, wrap_next, wrap_prev};

pub struct PlaybackController<R: MediaResource> {
    playlist: Playlist,
    state: PlaybackState,
    resource: R,
    registry: UrlRegistry,
    status: ResourceStatus,
    binding: Option<BindingId>,
    /// A start was requested before the resource reported ready.
    start_pending: bool,
    probe_tx: Sender<ProbeOutcome>,
    probe_rx: Receiver<ProbeOutcome>,
    probes_in_flight: usize,
}

impl<R: MediaResource> PlaybackController<R> {
    pub fn new(mut resource: R, registry: UrlRegistry, initial_volume: f32) -> Self {
        let (probe_tx, probe_rx) = mpsc::channel();
        let volume = if initial_volume.is_nan() {
            1.0
        } else {
            initial_volume.clamp(0.0, 1.0)
        };
        resource.set_volume(volume);
        let volume = resource.volume();

        Self {
            playlist: Playlist::new(),
            state: PlaybackState {
                volume,
                ..PlaybackState::default()
            },
            resource,
            registry,
            status: ResourceStatus::Idle,
            binding: None,
            start_pending: false,
            probe_tx,
            probe_rx,
            probes_in_flight: 0,
        }
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn status(&self) -> ResourceStatus {
        self.status
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.state.current_index.and_then(|i| self.playlist.get(i))
    }

    /// Number of duration probes that have not reported back yet.
    pub fn probes_in_flight(&self) -> usize {
        self.probes_in_flight
    }

    pub fn transport(&self) -> Transport {
        match (self.status, self.state.is_playing) {
            (ResourceStatus::Idle, _) => Transport::Stopped,
            (ResourceStatus::Loading, true) => Transport::Loading,
            (_, false) => Transport::Paused,
            (ResourceStatus::Ready, true) => Transport::Playing,
        }
    }

    /// Accept selected files: non-audio entries are dropped, the rest are
    /// probed concurrently and appended as their probes finish.
    ///
    /// Returns how many probes were started.
    pub fn add_files(&mut self, files: Vec<FileBlob>) -> usize {
        let mut started = 0;
        for blob in files {
            if !blob.is_audio() {
                debug!(name = blob.name(), media_type = blob.media_type(), "skipping non-audio file");
                continue;
            }
            let name = blob.name().to_string();
            match spawn_probe(Arc::new(blob), self.probe_tx.clone()) {
                Ok(()) => {
                    self.probes_in_flight += 1;
                    started += 1;
                }
                Err(e) => warn!(%name, error = %e, "failed to start duration probe"),
            }
        }
        started
    }

    /// Append a probed file as a new track.
    pub fn append_track(&mut self, source: Arc<FileBlob>, duration: Duration) {
        let url = self.registry.create(source.clone());
        let display_name = display_name(source.name());
        info!(name = %display_name, ?duration, %url, "track added");
        self.playlist.push(Track {
            source,
            url,
            display_name,
            duration,
        });
    }

    /// Drain finished probes and resource signals. Returns true when anything changed.
    pub fn pump(&mut self) -> bool {
        let mut changed = false;

        while let Ok(outcome) = self.probe_rx.try_recv() {
            self.probes_in_flight = self.probes_in_flight.saturating_sub(1);
            match outcome.result {
                Ok(duration) => {
                    self.append_track(outcome.blob, duration);
                    changed = true;
                }
                // An unreadable file simply never shows up in the playlist.
                Err(e) => warn!(name = outcome.blob.name(), error = %e, "duration probe failed"),
            }
        }

        while let Some(event) = self.resource.poll_event() {
            self.handle_event(event);
            changed = true;
        }

        changed
    }

    /// Apply one resource signal. Signals from a replaced binding are ignored.
    pub fn handle_event(&mut self, event: MediaEvent) {
        if Some(event.binding()) != self.binding {
            debug!(?event, "ignoring signal from a stale binding");
            return;
        }

        match event {
            MediaEvent::MetadataReady { duration, .. } => {
                // Zero means the engine could not tell; keep the probed length.
                if !duration.is_zero() {
                    self.state.duration = duration.as_secs_f64();
                }
                self.status = ResourceStatus::Ready;
                if self.start_pending && self.state.is_playing {
                    self.resource.play();
                }
                self.start_pending = false;
            }
            MediaEvent::PositionChanged { position, .. } => {
                self.state.current_time = position.as_secs_f64();
            }
            MediaEvent::Finished { .. } => {
                debug!(index = ?self.state.current_index, "track finished, advancing");
                self.next();
            }
            MediaEvent::LoadFailed { reason, .. } => {
                warn!(index = ?self.state.current_index, %reason, "failed to load track");
                self.status = ResourceStatus::Idle;
                self.binding = None;
                self.start_pending = false;
                self.state.is_playing = false;
            }
        }
    }

    /// Make `index` current and start it.
    ///
    /// Playing the track that is already bound restarts it from the top without
    /// reloading. An index outside the playlist is ignored.
    pub fn play(&mut self, index: usize) {
        let Some(track) = self.playlist.get(index) else {
            debug!(index, len = self.playlist.len(), "play on missing index ignored");
            return;
        };

        self.state.is_playing = true;
        self.state.current_time = 0.0;

        if self.state.current_index == Some(index) && self.binding.is_some() {
            self.resource.set_current_time(Duration::ZERO);
            self.request_start();
            return;
        }

        self.state.current_index = Some(index);
        self.state.duration = track.duration.as_secs_f64();
        self.binding = Some(self.resource.set_source(&track.url));
        self.status = ResourceStatus::Loading;
        self.start_pending = true;
        debug!(index, name = %track.display_name, "track bound");
    }

    pub fn toggle_play_pause(&mut self) {
        if self.state.current_index.is_none() {
            return;
        }

        if self.state.is_playing {
            self.state.is_playing = false;
            self.start_pending = false;
            self.resource.pause();
            if self.status == ResourceStatus::Ready {
                self.state.current_time = self.resource.current_time().as_secs_f64();
            }
        } else if self.binding.is_none() {
            // The last load failed; bind the track again.
            if let Some(index) = self.state.current_index {
                self.play(index);
            }
        } else {
            self.state.is_playing = true;
            self.request_start();
        }
    }

    /// Pause and rewind to the start, keeping the track bound.
    pub fn stop(&mut self) {
        if self.state.current_index.is_none() {
            return;
        }
        if self.state.is_playing {
            self.toggle_play_pause();
        }
        self.seek(0.0);
    }

    pub fn next(&mut self) {
        let Some(current) = self.state.current_index else {
            return;
        };
        if let Some(i) = wrap_next(current, self.playlist.len()) {
            self.play(i);
        }
    }

    pub fn previous(&mut self) {
        let Some(current) = self.state.current_index else {
            return;
        };
        if let Some(i) = wrap_prev(current, self.playlist.len()) {
            self.play(i);
        }
    }

    /// Jump to `seconds` within the current track, clamped to its duration.
    pub fn seek(&mut self, seconds: f64) {
        if self.state.current_index.is_none() {
            return;
        }
        let target = if seconds.is_nan() {
            0.0
        } else {
            seconds.clamp(0.0, self.state.duration.max(0.0))
        };
        self.state.current_time = target;
        self.resource
            .set_current_time(Duration::from_secs_f64(target));
    }

    /// Move `delta` seconds from the current position.
    pub fn seek_by(&mut self, delta: f64) {
        self.seek(self.state.current_time + delta);
    }

    pub fn set_volume(&mut self, volume: f32) {
        if volume.is_nan() {
            return;
        }
        self.state.volume = volume.clamp(0.0, 1.0);
        self.resource.set_volume(self.state.volume);
    }

    /// Remove the track at `index`, releasing its URL and keeping
    /// `current_index` pointing at the same track (or clearing it).
    pub fn remove_track(&mut self, index: usize) {
        let Some(removed) = self.playlist.remove(index) else {
            return;
        };
        info!(index, name = %removed.display_name, "track removed");
        drop(removed);

        match self.state.current_index {
            Some(current) if current == index => self.unbind(),
            Some(current) if index < current => {
                self.state.current_index = Some(current - 1);
            }
            _ => {}
        }
    }

    /// Release the resource and every track. The controller is empty afterwards.
    pub fn shutdown(&mut self, fade_out: Duration) {
        self.binding = None;
        self.status = ResourceStatus::Idle;
        self.state.current_index = None;
        self.state.is_playing = false;
        self.resource.shutdown(fade_out);
        self.playlist.clear();
        info!(live_urls = self.registry.live_count(), "controller shut down");
    }

    fn request_start(&mut self) {
        if self.status == ResourceStatus::Ready {
            self.resource.play();
            self.start_pending = false;
        } else {
            self.start_pending = true;
        }
    }

    fn unbind(&mut self) {
        self.resource.clear_source();
        self.binding = None;
        self.status = ResourceStatus::Idle;
        self.start_pending = false;
        self.state.current_index = None;
        self.state.is_playing = false;
        self.state.current_time = 0.0;
        self.state.duration = 0.0;
    }

    #[cfg(test)]
    pub(crate) fn resource_mut(&mut self) -> &mut R {
        &mut self.resource
    }

    #[cfg(test)]
    pub(crate) fn resource(&self) -> &R {
        &self.resource
    }
}
