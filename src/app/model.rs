//! Application model types: `Playlist`, `PlaybackState`, `Transport` and the
//! view-only `App` cursor state.

use crate::library::Track;

/// Ordered tracks, addressed by index only.
#[derive(Debug, Default)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, track: Track) {
        self.tracks.push(track);
    }

    /// Remove and return the track at `index`. Dropping it releases its URL.
    pub fn remove(&mut self, index: usize) -> Option<Track> {
        (index < self.tracks.len()).then(|| self.tracks.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }
}

/// Index after `index` in a cyclic list of `len` items.
pub fn wrap_next(index: usize, len: usize) -> Option<usize> {
    (len > 0).then(|| (index + 1) % len)
}

/// Index before `index` in a cyclic list of `len` items.
pub fn wrap_prev(index: usize, len: usize) -> Option<usize> {
    (len > 0).then(|| (index % len + len - 1) % len)
}

/// The single source of truth for what the media resource should be doing.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub current_index: Option<usize>,
    /// User intent; the resource may still be loading.
    pub is_playing: bool,
    /// Seconds into the current track.
    pub current_time: f64,
    /// Seconds, as reported by the resource's metadata.
    pub duration: f64,
    pub volume: f32,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            current_index: None,
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            volume: 1.0,
        }
    }
}

impl PlaybackState {
    /// Fraction of the track played, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Where the resource binding is in its lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ResourceStatus {
    /// No track bound.
    #[default]
    Idle,
    /// Source set, waiting for metadata.
    Loading,
    /// Metadata known; play/pause act immediately.
    Ready,
}

/// Derived transport state for display and MPRIS.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Transport {
    #[default]
    Stopped,
    Loading,
    Paused,
    Playing,
}

/// The playlist cursor and prompt state of the TUI.
#[derive(Debug, Default)]
pub struct App {
    pub selected: usize,
    /// Text typed into the add-files prompt, when it is open.
    pub prompt: Option<String>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the cursor down, wrapping like the transport does.
    pub fn next(&mut self, len: usize) {
        if let Some(i) = wrap_next(self.selected, len) {
            self.selected = i;
        }
    }

    /// Move the cursor up, wrapping.
    pub fn prev(&mut self, len: usize) {
        if let Some(i) = wrap_prev(self.selected, len) {
            self.selected = i;
        }
    }

    pub fn first(&mut self) {
        self.selected = 0;
    }

    pub fn last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    /// Keep the cursor inside a playlist of `len` rows.
    pub fn clamp(&mut self, len: usize) {
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    pub fn open_prompt(&mut self) {
        self.prompt = Some(String::new());
    }

    /// Close the prompt, returning what was typed.
    pub fn take_prompt(&mut self) -> Option<String> {
        self.prompt.take()
    }

    pub fn prompt_push(&mut self, c: char) {
        if let Some(p) = self.prompt.as_mut() {
            p.push(c);
        }
    }

    pub fn prompt_pop(&mut self) {
        if let Some(p) = self.prompt.as_mut() {
            p.pop();
        }
    }
}
