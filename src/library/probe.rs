//! Duration probing for newly selected files.
//!
//! Each probe runs on its own short-lived worker thread and reports back over a
//! channel, so selections of many files are probed concurrently and the event
//! loop appends them in whatever order they finish.

use std::io::{self, Cursor};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use lofty::prelude::*;
use lofty::probe::Probe;
use rodio::{Decoder, Source};
use thiserror::Error;
use tracing::trace;

use super::blob::FileBlob;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to read {0}")]
    Io(#[from] io::Error),
    #[error("unreadable metadata: {0}")]
    Metadata(String),
    #[error("no duration could be determined")]
    NoDuration,
}

/// Result of one detached probe.
#[derive(Debug)]
pub struct ProbeOutcome {
    pub blob: Arc<FileBlob>,
    pub result: Result<Duration, ProbeError>,
}

/// Determine the duration of an in-memory file.
///
/// Container metadata is tried first; formats that carry no usable duration
/// there fall back to asking the decoder.
pub fn probe_duration(blob: &FileBlob) -> Result<Duration, ProbeError> {
    let from_tags = Probe::new(Cursor::new(blob.bytes()))
        .guess_file_type()?
        .read()
        .map(|tagged| tagged.properties().duration())
        .map_err(|e| ProbeError::Metadata(e.to_string()));

    match from_tags {
        Ok(d) if !d.is_zero() => Ok(d),
        Ok(_) => decoder_duration(blob),
        Err(e) => decoder_duration(blob).map_err(|_| e),
    }
}

fn decoder_duration(blob: &FileBlob) -> Result<Duration, ProbeError> {
    let decoder = Decoder::new(Cursor::new(blob.bytes()))
        .map_err(|e| ProbeError::Metadata(e.to_string()))?;
    decoder.total_duration().ok_or(ProbeError::NoDuration)
}

/// Probe `blob` on a worker thread, sending the outcome to `tx`.
pub fn spawn_probe(blob: Arc<FileBlob>, tx: Sender<ProbeOutcome>) -> io::Result<()> {
    thread::Builder::new()
        .name("probe".to_string())
        .spawn(move || {
            let result = probe_duration(&blob);
            trace!(name = blob.name(), ok = result.is_ok(), "probe finished");
            // The receiver is gone once the controller shut down; nothing to report to.
            let _ = tx.send(ProbeOutcome { blob, result });
        })
        .map(|_| ())
}
