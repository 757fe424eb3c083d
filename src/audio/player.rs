use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AudioSettings;
use crate::library::PlayableUrl;

use super::resource::MediaResource;
use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, BindingId, MediaEvent, PlaybackHandle, PlaybackInfo};

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device: {0}")]
    NoOutput(String),
    #[error("failed to start the audio thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("the audio thread exited during startup")]
    ThreadDied,
}

/// `MediaResource` backed by a rodio audio thread.
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    events: Receiver<MediaEvent>,
    event_tx: Sender<MediaEvent>,
    playback: PlaybackHandle,
    join: Mutex<Option<JoinHandle<()>>>,
    next_binding: u64,
    bound: Option<BindingId>,
    volume: f32,
}

impl AudioPlayer {
    pub fn new(audio_settings: AudioSettings) -> Result<Self, AudioError> {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (event_tx, event_rx) = mpsc::channel::<MediaEvent>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), String>>(1);
        let playback_info: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));
        let volume = audio_settings.initial_volume.clamp(0.0, 1.0);

        let audio_handle = spawn_audio_thread(
            rx,
            event_tx.clone(),
            playback_info.clone(),
            audio_settings,
            ready_tx,
        )?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(msg)) => return Err(AudioError::NoOutput(msg)),
            Err(_) => return Err(AudioError::ThreadDied),
        }

        Ok(Self {
            tx,
            events: event_rx,
            event_tx,
            playback: playback_info,
            join: Mutex::new(Some(audio_handle)),
            next_binding: 0,
            bound: None,
            volume,
        })
    }

    fn send(&self, cmd: AudioCmd) {
        if let Err(e) = self.tx.send(cmd) {
            warn!(cmd = ?e.0, "audio thread is gone, dropping command");
        }
    }

    pub fn quit_softly(&self, fade_out: Duration) {
        self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl MediaResource for AudioPlayer {
    fn set_source(&mut self, url: &PlayableUrl) -> BindingId {
        self.next_binding += 1;
        let binding = BindingId(self.next_binding);
        self.bound = Some(binding);

        match url.resolve() {
            Some(source) => self.send(AudioCmd::Load { binding, source }),
            None => {
                // Released URLs can't be loaded; report it like any other load failure.
                warn!(%url, "binding a released url");
                self.send(AudioCmd::Unload);
                let _ = self.event_tx.send(MediaEvent::LoadFailed {
                    binding,
                    reason: format!("{url} was released"),
                });
                return binding;
            }
        }
        debug!(?binding, %url, "source bound");
        binding
    }

    fn clear_source(&mut self) {
        self.bound = None;
        self.send(AudioCmd::Unload);
    }

    fn play(&mut self) {
        self.send(AudioCmd::Play);
    }

    fn pause(&mut self) {
        self.send(AudioCmd::Pause);
    }

    fn current_time(&self) -> Duration {
        self.playback
            .lock()
            .ok()
            .filter(|info| info.binding == self.bound)
            .map(|info| info.position)
            .unwrap_or(Duration::ZERO)
    }

    fn set_current_time(&mut self, position: Duration) {
        self.send(AudioCmd::Seek(position));
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.send(AudioCmd::SetVolume(self.volume));
    }

    fn poll_event(&mut self) -> Option<MediaEvent> {
        loop {
            let event = self.events.try_recv().ok()?;
            // Signals for an earlier binding were queued before it was replaced.
            if Some(event.binding()) == self.bound {
                return Some(event);
            }
        }
    }

    fn shutdown(&mut self, fade_out: Duration) {
        self.bound = None;
        self.quit_softly(fade_out);
    }
}
