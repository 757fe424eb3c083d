//! Utilities for creating `rodio` sinks from in-memory blobs.
//!
//! The helper here encapsulates decoding a blob and preparing a paused `Sink`
//! at the requested start position.

use std::io::Cursor;
use std::time::Duration;

use rodio::decoder::DecoderError;
use rodio::{Decoder, OutputStream, Sink, Source};

use crate::library::FileBlob;

/// Create a paused `Sink` for `blob` that starts playback at `start_at`.
///
/// Also returns the decoder's idea of the total length when it has one.
pub(super) fn create_sink_at(
    handle: &OutputStream,
    blob: &FileBlob,
    start_at: Duration,
) -> Result<(Sink, Option<Duration>), DecoderError> {
    let decoder = Decoder::new(Cursor::new(blob.bytes()))?;
    let total = decoder.total_duration();
    // `skip_duration` is our fallback seeking primitive; even Duration::ZERO is fine.
    let source = decoder.skip_duration(start_at);

    let sink = Sink::connect_new(handle.mixer());
    sink.append(source);
    sink.pause();
    Ok((sink, total))
}
