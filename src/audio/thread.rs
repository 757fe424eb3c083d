use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, warn};

use crate::config::AudioSettings;
use crate::library::{FileBlob, probe_duration};

use super::sink::create_sink_at;
use super::types::{AudioCmd, BindingId, MediaEvent, PlaybackHandle};

/// The sink for the current binding plus what is needed to rebuild it.
struct Loaded {
    binding: BindingId,
    source: Arc<FileBlob>,
    sink: Sink,
    paused: bool,
    finished: bool,
    /// Length reported with `MetadataReady`; zero when unknown.
    duration: Duration,
    /// Position the sink started at when it had to be rebuilt to seek.
    offset: Duration,
}

impl Loaded {
    fn position(&self) -> Duration {
        self.offset + self.sink.get_pos()
    }
}

/// Whether seeking to `to` lands at or past the end of a source of `duration`.
pub(super) fn seek_reaches_end(duration: Duration, to: Duration) -> bool {
    !duration.is_zero() && to >= duration
}

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    events: Sender<MediaEvent>,
    playback_info: PlaybackHandle,
    audio_settings: AudioSettings,
    ready: SyncSender<Result<(), String>>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new().name("audio".to_string()).spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                let _ = ready.send(Err(e.to_string()));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);
        let _ = ready.send(Ok(()));

        let interval = Duration::from_millis(audio_settings.position_interval_ms.max(10));
        let mut volume = audio_settings.initial_volume.clamp(0.0, 1.0);
        let mut loaded: Option<Loaded> = None;
        let mut last_tick = Instant::now();

        fn publish(playback_info: &PlaybackHandle, loaded: &Option<Loaded>) {
            if let Ok(mut info) = playback_info.lock() {
                match loaded {
                    Some(l) => {
                        info.binding = Some(l.binding);
                        info.position = l.position();
                        info.playing = !l.paused;
                    }
                    None => {
                        info.binding = None;
                        info.position = Duration::ZERO;
                        info.playing = false;
                    }
                }
            }
        }

        fn rebuild_at(
            stream: &OutputStream,
            l: &mut Loaded,
            at: Duration,
            volume: f32,
        ) {
            match create_sink_at(stream, &l.source, at) {
                Ok((sink, _)) => {
                    l.sink.stop();
                    sink.set_volume(volume);
                    if !l.paused {
                        sink.play();
                    }
                    l.sink = sink;
                    l.offset = at;
                }
                Err(e) => warn!(error = %e, "failed to rebuild sink"),
            }
        }

        fn fade_out_sink(sink: &Sink, fade_out_ms: u64) {
            if fade_out_ms == 0 {
                sink.set_volume(0.0);
                return;
            }
            let steps: u64 = 20;
            let step_ms = (fade_out_ms / steps).max(1);
            let start = sink.volume();
            for step in 1..=steps {
                let t = step as f32 / steps as f32;
                sink.set_volume(start * (1.0 - t));
                thread::sleep(Duration::from_millis(step_ms));
            }
            sink.set_volume(0.0);
        }

        loop {
            let wait = interval.saturating_sub(last_tick.elapsed());
            match rx.recv_timeout(wait) {
                Ok(cmd) => match cmd {
                    AudioCmd::Load { binding, source } => {
                        if let Some(old) = loaded.take() {
                            old.sink.stop();
                        }
                        match create_sink_at(&stream, &source, Duration::ZERO) {
                            Ok((sink, total)) => {
                                sink.set_volume(volume);
                                // Some containers (VBR mp3) don't report a length to the
                                // decoder; the tag reader usually knows it.
                                let duration = total
                                    .or_else(|| probe_duration(&source).ok())
                                    .unwrap_or_default();
                                debug!(?binding, name = source.name(), ?duration, "source loaded");
                                loaded = Some(Loaded {
                                    binding,
                                    source,
                                    sink,
                                    paused: true,
                                    finished: false,
                                    duration,
                                    offset: Duration::ZERO,
                                });
                                publish(&playback_info, &loaded);
                                let _ = events.send(MediaEvent::MetadataReady { binding, duration });
                            }
                            Err(e) => {
                                warn!(?binding, name = source.name(), error = %e, "failed to decode source");
                                publish(&playback_info, &loaded);
                                let _ = events.send(MediaEvent::LoadFailed {
                                    binding,
                                    reason: e.to_string(),
                                });
                            }
                        }
                    }

                    AudioCmd::Unload => {
                        if let Some(old) = loaded.take() {
                            old.sink.stop();
                        }
                        publish(&playback_info, &loaded);
                    }

                    AudioCmd::Play => {
                        if let Some(l) = loaded.as_mut() {
                            if l.finished {
                                // Played out: start the same source over.
                                l.finished = false;
                                rebuild_at(&stream, l, Duration::ZERO, volume);
                            }
                            l.sink.play();
                            l.paused = false;
                        }
                        publish(&playback_info, &loaded);
                    }

                    AudioCmd::Pause => {
                        if let Some(l) = loaded.as_mut() {
                            l.sink.pause();
                            l.paused = true;
                        }
                        publish(&playback_info, &loaded);
                    }

                    AudioCmd::Seek(to) => {
                        let Some(l) = loaded.as_mut() else {
                            continue;
                        };
                        l.finished = false;
                        if l.sink.empty() {
                            // The source already played out; there is nothing left to seek in.
                            rebuild_at(&stream, l, to, volume);
                        } else {
                            match l.sink.try_seek(to) {
                                Ok(()) => l.offset = Duration::ZERO,
                                Err(e) => {
                                    // Not every decoder can seek; rebuild and skip into the blob.
                                    debug!(error = %e, "seek unsupported, rebuilding sink");
                                    rebuild_at(&stream, l, to, volume);
                                }
                            }
                        }
                        // Ticks only run while playing, so a paused seek to the end
                        // has to report the finish itself.
                        if seek_reaches_end(l.duration, to) {
                            l.finished = true;
                            l.paused = true;
                            l.sink.pause();
                            let _ = events.send(MediaEvent::Finished { binding: l.binding });
                        }
                        publish(&playback_info, &loaded);
                    }

                    AudioCmd::SetVolume(v) => {
                        volume = v.clamp(0.0, 1.0);
                        if let Some(l) = loaded.as_ref() {
                            l.sink.set_volume(volume);
                        }
                    }

                    AudioCmd::Quit { fade_out_ms } => {
                        if let Some(l) = loaded.take() {
                            if !l.paused {
                                // Fade out gently before stopping.
                                fade_out_sink(&l.sink, fade_out_ms);
                            }
                            l.sink.stop();
                        }
                        publish(&playback_info, &loaded);
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            if last_tick.elapsed() >= interval {
                last_tick = Instant::now();
                if let Some(l) = loaded.as_mut() {
                    if !l.paused {
                        let _ = events.send(MediaEvent::PositionChanged {
                            binding: l.binding,
                            position: l.position(),
                        });
                        if l.sink.empty() && !l.finished {
                            l.finished = true;
                            l.paused = true;
                            let _ = events.send(MediaEvent::Finished { binding: l.binding });
                        }
                    }
                }
                publish(&playback_info, &loaded);
            }
        }

        if let Some(l) = loaded.take() {
            l.sink.stop();
        }
        debug!("audio thread stopped");
    })
}
