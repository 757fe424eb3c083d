use crate::app::{PlaybackController, Transport};
use crate::audio::MediaResource;
use crate::library::UrlId;
use crate::mpris::MprisHandle;

/// What MPRIS last saw, so unchanged state is not republished every frame.
pub type MprisSnapshot = (Option<UrlId>, Transport);

pub fn snapshot<R: MediaResource>(controller: &PlaybackController<R>) -> MprisSnapshot {
    (
        controller.current_track().map(|t| t.url.id()),
        controller.transport(),
    )
}

pub fn update_mpris<R: MediaResource>(mpris: &MprisHandle, controller: &PlaybackController<R>) {
    let index = controller.state().current_index;
    mpris.set_track_metadata(index, controller.current_track());
    mpris.set_playback(controller.transport());
}
