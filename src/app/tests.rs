use super::*;
use crate::audio::fake::{Call, FakeResource};
use crate::audio::{BindingId, MediaEvent};
use crate::library::tests::wav_bytes;
use crate::library::{FileBlob, UrlRegistry};
use proptest::prelude::*;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn blob(name: &str) -> Arc<FileBlob> {
    Arc::new(FileBlob::new(name, "audio/mpeg", Vec::new()))
}

fn controller_with(durations: &[u64]) -> (PlaybackController<FakeResource>, UrlRegistry) {
    let registry = UrlRegistry::new();
    let mut c = PlaybackController::new(FakeResource::new(), registry.clone(), 1.0);
    for (i, secs) in durations.iter().enumerate() {
        c.append_track(blob(&format!("track{i}.mp3")), Duration::from_secs(*secs));
    }
    (c, registry)
}

/// Bind `index` and let the fake resource report ready.
fn play_ready(c: &mut PlaybackController<FakeResource>, index: usize) {
    c.play(index);
    let secs = c.state().duration;
    c.resource_mut().metadata_ready(secs);
    c.pump();
}

#[test]
fn append_track_strips_extension_and_mints_url() {
    let (c, registry) = controller_with(&[180, 210]);
    assert_eq!(c.playlist().len(), 2);
    assert_eq!(c.playlist().get(0).unwrap().display_name, "track0");
    assert_eq!(
        c.playlist().get(1).unwrap().duration,
        Duration::from_secs(210)
    );
    assert_eq!(registry.live_count(), 2);
}

#[test]
fn play_sets_current_and_defers_start_until_ready() {
    let (mut c, _) = controller_with(&[180, 210]);

    c.play(1);
    assert_eq!(c.state().current_index, Some(1));
    assert!(c.state().is_playing);
    assert_eq!(c.status(), ResourceStatus::Loading);
    assert_eq!(c.transport(), Transport::Loading);
    assert_eq!(c.resource().count(&Call::Play), 0);

    c.resource_mut().metadata_ready(210.0);
    assert!(c.pump());
    assert_eq!(c.status(), ResourceStatus::Ready);
    assert_eq!(c.transport(), Transport::Playing);
    assert_eq!(c.state().duration, 210.0);
    assert_eq!(c.resource().count(&Call::Play), 1);
}

#[test]
fn play_on_missing_index_is_ignored() {
    let (mut c, _) = controller_with(&[180]);
    let before = c.state().clone();
    c.play(5);
    assert_eq!(c.state(), &before);
    assert_eq!(c.status(), ResourceStatus::Idle);
}

#[test]
fn play_on_bound_track_restarts_without_reloading() {
    let (mut c, _) = controller_with(&[180, 210]);
    play_ready(&mut c, 0);
    let binding = c.resource().bound.unwrap();
    c.resource_mut().emit(MediaEvent::PositionChanged {
        binding,
        position: Duration::from_secs(42),
    });
    c.pump();
    assert_eq!(c.state().current_time, 42.0);

    c.play(0);
    assert_eq!(c.state().current_time, 0.0);
    assert!(c.state().is_playing);
    let loads = c
        .resource()
        .calls
        .iter()
        .filter(|call| matches!(call, Call::SetSource(_)))
        .count();
    assert_eq!(loads, 1);
    assert_eq!(c.resource().count(&Call::Seek(Duration::ZERO)), 1);
    assert_eq!(c.resource().count(&Call::Play), 2);
}

#[test]
fn toggle_pauses_and_resumes() {
    let (mut c, _) = controller_with(&[180]);
    play_ready(&mut c, 0);

    c.toggle_play_pause();
    assert!(!c.state().is_playing);
    assert_eq!(c.transport(), Transport::Paused);
    assert_eq!(c.resource().count(&Call::Pause), 1);

    c.toggle_play_pause();
    assert!(c.state().is_playing);
    assert_eq!(c.resource().count(&Call::Play), 2);
}

#[test]
fn resume_while_loading_waits_for_ready() {
    let (mut c, _) = controller_with(&[180]);
    c.play(0);
    c.toggle_play_pause();
    c.toggle_play_pause();
    assert_eq!(c.resource().count(&Call::Play), 0);

    c.resource_mut().metadata_ready(180.0);
    c.pump();
    assert_eq!(c.resource().count(&Call::Play), 1);
}

#[test]
fn pause_while_loading_cancels_the_queued_start() {
    let (mut c, _) = controller_with(&[180]);
    c.play(0);
    c.toggle_play_pause();

    c.resource_mut().metadata_ready(180.0);
    c.pump();
    assert_eq!(c.resource().count(&Call::Play), 0);
    assert_eq!(c.transport(), Transport::Paused);
}

#[test]
fn next_and_previous_wrap_around() {
    let (mut c, _) = controller_with(&[10, 20, 30]);
    play_ready(&mut c, 2);

    c.next();
    assert_eq!(c.state().current_index, Some(0));
    c.previous();
    assert_eq!(c.state().current_index, Some(2));
    c.previous();
    assert_eq!(c.state().current_index, Some(1));
}

#[test]
fn next_on_single_track_restarts_it() {
    let (mut c, _) = controller_with(&[10]);
    play_ready(&mut c, 0);
    c.next();
    assert_eq!(c.state().current_index, Some(0));
    assert!(c.state().is_playing);
    assert_eq!(c.resource().count(&Call::Seek(Duration::ZERO)), 1);
}

#[test]
fn finished_signal_advances_and_keeps_playing() {
    let (mut c, _) = controller_with(&[180, 210]);
    play_ready(&mut c, 0);

    c.resource_mut().finished();
    c.pump();
    assert_eq!(c.state().current_index, Some(1));
    assert!(c.state().is_playing);
    assert_eq!(c.state().duration, 210.0);
}

#[test]
fn finished_on_last_track_wraps_to_first() {
    let (mut c, _) = controller_with(&[180, 210]);
    play_ready(&mut c, 1);

    c.resource_mut().finished();
    c.pump();
    assert_eq!(c.state().current_index, Some(0));
    assert!(c.state().is_playing);
}

#[test]
fn signals_from_a_replaced_binding_are_ignored() {
    let (mut c, _) = controller_with(&[180, 210]);
    c.play(0);
    let old = c.resource().bound.unwrap();
    c.play(1);

    c.handle_event(MediaEvent::MetadataReady {
        binding: old,
        duration: Duration::from_secs(180),
    });
    c.handle_event(MediaEvent::Finished { binding: old });
    assert_eq!(c.status(), ResourceStatus::Loading);
    assert_eq!(c.state().current_index, Some(1));
    assert_eq!(c.resource().count(&Call::Play), 0);

    c.handle_event(MediaEvent::PositionChanged {
        binding: BindingId(999),
        position: Duration::from_secs(5),
    });
    assert_eq!(c.state().current_time, 0.0);
}

#[test]
fn load_failure_stops_playback() {
    let (mut c, _) = controller_with(&[180]);
    c.play(0);
    let binding = c.resource().bound.unwrap();
    c.resource_mut().emit(MediaEvent::LoadFailed {
        binding,
        reason: "corrupt".to_string(),
    });
    c.pump();

    assert!(!c.state().is_playing);
    assert_eq!(c.transport(), Transport::Stopped);
    assert_eq!(c.state().current_index, Some(0));

    // Playing it again rebinds.
    c.play(0);
    assert_eq!(c.status(), ResourceStatus::Loading);
}

#[test]
fn resume_after_load_failure_rebinds_the_track() {
    let (mut c, _) = controller_with(&[180]);
    c.play(0);
    let binding = c.resource().bound.unwrap();
    c.resource_mut().emit(MediaEvent::LoadFailed {
        binding,
        reason: "corrupt".to_string(),
    });
    c.pump();

    c.toggle_play_pause();
    let loads = c
        .resource()
        .calls
        .iter()
        .filter(|call| matches!(call, Call::SetSource(_)))
        .count();
    assert_eq!(loads, 2);
    assert!(c.state().is_playing);
    assert_eq!(c.transport(), Transport::Loading);

    c.resource_mut().metadata_ready(180.0);
    c.pump();
    assert_eq!(c.transport(), Transport::Playing);
    assert_eq!(c.resource().count(&Call::Play), 1);
}

#[test]
fn unknown_engine_length_keeps_probed_duration() {
    let (mut c, _) = controller_with(&[180]);
    c.play(0);
    c.resource_mut().metadata_ready(0.0);
    c.pump();
    assert_eq!(c.status(), ResourceStatus::Ready);
    assert_eq!(c.state().duration, 180.0);

    c.seek(60.0);
    assert_eq!(c.state().current_time, 60.0);
}

#[test]
fn removing_current_track_stops_and_releases_it() {
    let (mut c, registry) = controller_with(&[180, 210, 240]);
    play_ready(&mut c, 1);

    c.remove_track(1);
    assert_eq!(c.state().current_index, None);
    assert!(!c.state().is_playing);
    assert_eq!(c.transport(), Transport::Stopped);
    assert_eq!(c.playlist().len(), 2);
    assert_eq!(registry.live_count(), 2);
    assert_eq!(c.resource().count(&Call::ClearSource), 1);
}

#[test]
fn removing_other_tracks_reindexes_current() {
    let (mut c, _) = controller_with(&[1, 2, 3, 4]);
    play_ready(&mut c, 2);

    c.remove_track(3);
    assert_eq!(c.state().current_index, Some(2));
    c.remove_track(0);
    assert_eq!(c.state().current_index, Some(1));
    assert_eq!(c.current_track().unwrap().display_name, "track2");
    assert!(c.state().is_playing);

    c.remove_track(10);
    assert_eq!(c.playlist().len(), 2);
}

#[test]
fn seek_clamps_to_track_bounds() {
    let (mut c, _) = controller_with(&[180]);
    play_ready(&mut c, 0);

    c.seek(-5.0);
    assert_eq!(c.state().current_time, 0.0);
    c.seek(180.0 + 100.0);
    assert_eq!(c.state().current_time, 180.0);
    assert_eq!(
        c.resource().calls.last(),
        Some(&Call::Seek(Duration::from_secs(180)))
    );
    c.seek(f64::NAN);
    assert_eq!(c.state().current_time, 0.0);

    c.seek(30.0);
    c.seek_by(-40.0);
    assert_eq!(c.state().current_time, 0.0);
    c.seek_by(15.0);
    assert_eq!(c.state().current_time, 15.0);
}

#[test]
fn volume_clamps_to_unit_range() {
    let (mut c, _) = controller_with(&[]);
    c.set_volume(1.5);
    assert_eq!(c.state().volume, 1.0);
    c.set_volume(-0.2);
    assert_eq!(c.state().volume, 0.0);
    c.set_volume(0.4);
    assert_eq!(c.state().volume, 0.4);
    assert_eq!(c.resource().volume, 0.4);
    c.set_volume(f32::NAN);
    assert_eq!(c.state().volume, 0.4);
}

#[test]
fn transport_commands_on_empty_playlist_are_noops() {
    let (mut c, _) = controller_with(&[]);
    let before = c.state().clone();
    let calls_before = c.resource().calls.len();

    c.toggle_play_pause();
    c.next();
    c.previous();
    c.seek(10.0);
    c.stop();
    c.remove_track(0);

    assert_eq!(c.state(), &before);
    assert_eq!(c.resource().calls.len(), calls_before);
}

#[test]
fn transport_commands_without_current_track_are_noops() {
    let (mut c, _) = controller_with(&[180, 210]);
    let before = c.state().clone();

    c.toggle_play_pause();
    c.next();
    c.previous();
    c.seek(10.0);

    assert_eq!(c.state(), &before);
    assert_eq!(c.status(), ResourceStatus::Idle);
}

#[test]
fn stop_pauses_and_rewinds() {
    let (mut c, _) = controller_with(&[180]);
    play_ready(&mut c, 0);
    c.seek(60.0);

    c.stop();
    assert!(!c.state().is_playing);
    assert_eq!(c.state().current_time, 0.0);
    assert_eq!(c.state().current_index, Some(0));
}

#[test]
fn shutdown_releases_every_track() {
    let (mut c, registry) = controller_with(&[180, 210]);
    play_ready(&mut c, 0);

    c.shutdown(Duration::ZERO);
    assert_eq!(registry.live_count(), 0);
    assert!(c.playlist().is_empty());
    assert_eq!(c.state().current_index, None);
    assert_eq!(c.resource().calls.last(), Some(&Call::Shutdown));
}

#[test]
fn add_files_filters_non_audio_and_appends_probed_tracks() {
    let (mut c, _) = controller_with(&[]);
    let files = vec![
        FileBlob::new("one.wav", "audio/wav", wav_bytes(1000)),
        FileBlob::new("notes.txt", "text/plain", b"hello".to_vec()),
        FileBlob::new("broken.mp3", "audio/mpeg", b"not audio at all".to_vec()),
        FileBlob::new("two.wav", "audio/wav", wav_bytes(2000)),
    ];

    assert_eq!(c.add_files(files), 3);

    let deadline = Instant::now() + Duration::from_secs(10);
    while c.probes_in_flight() > 0 && Instant::now() < deadline {
        c.pump();
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(c.probes_in_flight(), 0);

    let mut names: Vec<(String, u64)> = c
        .playlist()
        .iter()
        .map(|t| (t.display_name.clone(), t.duration.as_secs()))
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![("one".to_string(), 1), ("two".to_string(), 2)]
    );
}

#[test]
fn progress_is_a_bounded_fraction() {
    let mut s = PlaybackState::default();
    assert_eq!(s.progress(), 0.0);
    s.duration = 200.0;
    s.current_time = 50.0;
    assert_eq!(s.progress(), 0.25);
    s.current_time = 500.0;
    assert_eq!(s.progress(), 1.0);
}

#[test]
fn app_cursor_wraps_and_clamps() {
    let mut app = App::new();
    app.prev(3);
    assert_eq!(app.selected, 2);
    app.next(3);
    assert_eq!(app.selected, 0);
    app.last(3);
    assert_eq!(app.selected, 2);
    app.clamp(2);
    assert_eq!(app.selected, 1);
    app.clamp(0);
    assert_eq!(app.selected, 0);
    app.next(0);
    assert_eq!(app.selected, 0);
}

#[test]
fn app_prompt_collects_text() {
    let mut app = App::new();
    app.prompt_push('x');
    assert!(app.prompt.is_none());

    app.open_prompt();
    app.prompt_push('a');
    app.prompt_push('b');
    app.prompt_pop();
    assert_eq!(app.take_prompt().as_deref(), Some("a"));
    assert!(app.prompt.is_none());
}

proptest! {
    #[test]
    fn play_sets_index_and_playing(len in 1usize..20, pick in 0usize..20) {
        let durations: Vec<u64> = (0..len as u64).map(|i| 60 + i).collect();
        let (mut c, _) = controller_with(&durations);
        let index = pick % len;
        c.play(index);
        prop_assert_eq!(c.state().current_index, Some(index));
        prop_assert!(c.state().is_playing);
    }

    #[test]
    fn next_len_times_returns_to_start(len in 1usize..16, start in 0usize..16) {
        let durations = vec![60u64; len];
        let (mut c, _) = controller_with(&durations);
        let start = start % len;
        play_ready(&mut c, start);
        for _ in 0..len {
            c.next();
        }
        prop_assert_eq!(c.state().current_index, Some(start));
    }

    #[test]
    fn previous_inverts_next(len in 1usize..16, start in 0usize..16) {
        let durations = vec![60u64; len];
        let (mut c, _) = controller_with(&durations);
        let start = start % len;
        c.play(start);

        c.next();
        c.previous();
        prop_assert_eq!(c.state().current_index, Some(start));

        c.previous();
        c.next();
        prop_assert_eq!(c.state().current_index, Some(start));
    }

    #[test]
    fn remove_keeps_current_on_the_same_track(
        len in 2usize..12,
        current in 0usize..12,
        removed in 0usize..12,
    ) {
        let durations: Vec<u64> = (0..len as u64).collect();
        let (mut c, registry) = controller_with(&durations);
        let current = current % len;
        let removed = removed % len;
        c.play(current);
        let name = c.current_track().map(|t| t.display_name.clone());

        c.remove_track(removed);

        prop_assert_eq!(registry.live_count(), len - 1);
        if removed == current {
            prop_assert_eq!(c.state().current_index, None);
            prop_assert!(!c.state().is_playing);
        } else {
            let expected = if removed < current { current - 1 } else { current };
            prop_assert_eq!(c.state().current_index, Some(expected));
            prop_assert_eq!(c.current_track().map(|t| t.display_name.clone()), name);
        }
    }

    #[test]
    fn seek_and_volume_stay_in_range(t in -1.0e6f64..1.0e6, v in -10.0f32..10.0) {
        let (mut c, _) = controller_with(&[300]);
        play_ready(&mut c, 0);
        c.seek(t);
        c.set_volume(v);
        prop_assert!((0.0..=300.0).contains(&c.state().current_time));
        prop_assert!((0.0..=1.0).contains(&c.state().volume));
    }
}
