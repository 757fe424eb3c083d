use std::sync::Arc;
use std::time::Duration;

use super::blob::FileBlob;
use super::url::PlayableUrl;

/// One playlist entry. Dropping it releases `url`.
#[derive(Debug)]
pub struct Track {
    pub source: Arc<FileBlob>,
    pub url: PlayableUrl,
    pub display_name: String,
    pub duration: Duration,
}
