//! File selection and track model.
//!
//! Selected files are read into memory (`FileBlob`), given an ephemeral
//! `PlayableUrl`, probed for their duration and wrapped into `Track`s.

mod blob;
mod display;
mod model;
mod probe;
mod scan;
mod url;

pub use blob::FileBlob;
pub use display::{display_name, format_time};
pub use model::Track;
pub use probe::{ProbeOutcome, probe_duration, spawn_probe};
pub use scan::{select, split_selection};
pub use url::{PlayableUrl, UrlId, UrlRegistry};
