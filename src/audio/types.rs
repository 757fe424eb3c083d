//! Audio-related small types and handles.
//!
//! This module defines the commands sent to the audio thread, the signals it
//! emits back, and the shared playback info handle.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::library::FileBlob;

/// Identifies one `set_source` binding. Signals from older bindings are stale.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(pub(crate) u64);

#[derive(Debug)]
pub enum AudioCmd {
    /// Decode `source` into a fresh, paused sink tagged with `binding`.
    Load {
        binding: BindingId,
        source: Arc<FileBlob>,
    },
    /// Drop the current sink, if any.
    Unload,
    /// Start or resume the loaded sink.
    Play,
    /// Pause the loaded sink.
    Pause,
    /// Jump to an absolute position in the loaded sink.
    Seek(Duration),
    /// Set the output volume (0.0 - 1.0).
    SetVolume(f32),
    /// Quit the audio thread, fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// Signals emitted by a media resource for its current binding.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// The source decoded far enough to know its length; play may start now.
    MetadataReady {
        binding: BindingId,
        duration: Duration,
    },
    /// Periodic position report while playing.
    PositionChanged {
        binding: BindingId,
        position: Duration,
    },
    /// The source played to its end.
    Finished { binding: BindingId },
    /// The source could not be decoded.
    LoadFailed { binding: BindingId, reason: String },
}

impl MediaEvent {
    pub fn binding(&self) -> BindingId {
        match self {
            Self::MetadataReady { binding, .. }
            | Self::PositionChanged { binding, .. }
            | Self::Finished { binding }
            | Self::LoadFailed { binding, .. } => *binding,
        }
    }
}

#[derive(Debug, Clone)]
/// Runtime playback information shared between the audio thread and its handle.
pub struct PlaybackInfo {
    /// Binding currently loaded in the audio thread (if any).
    pub binding: Option<BindingId>,
    /// Position within the loaded source.
    pub position: Duration,
    /// Whether the sink is currently producing sound.
    pub playing: bool,
}

impl Default for PlaybackInfo {
    fn default() -> Self {
        Self {
            binding: None,
            position: Duration::ZERO,
            playing: false,
        }
    }
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;
