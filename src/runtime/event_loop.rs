use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, info};

use crate::app::{App, PlaybackController};
use crate::audio::MediaResource;
use crate::config;
use crate::library;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::runtime::mpris_sync::{MprisSnapshot, snapshot, update_mpris};
use crate::ui;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    /// Track and transport as last published to MPRIS.
    pub last_mpris: Option<MprisSnapshot>,
}

impl EventLoopState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Main terminal event loop: drains controller signals, keeps MPRIS in sync,
/// draws, and dispatches keys and desktop commands. Returns `Ok(())` when
/// shutdown is requested.
pub fn run<R: MediaResource>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut PlaybackController<R>,
    mpris: &MprisHandle,
    control_tx: &mpsc::Sender<ControlCmd>,
    control_rx: &mpsc::Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        controller.pump();
        app.clamp(controller.playlist().len());

        // Covers changes from media keys and auto-advance as well as the keyboard.
        let now = snapshot(controller);
        if state.last_mpris != Some(now) {
            update_mpris(mpris, controller);
            state.last_mpris = Some(now);
        }

        terminal.draw(|f| ui::draw(f, app, controller, &settings.ui, &settings.controls))?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, app, controller) {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, controller, control_tx, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Apply a desktop command. Returns true when the app should quit.
pub fn handle_control_cmd<R: MediaResource>(
    cmd: ControlCmd,
    app: &App,
    controller: &mut PlaybackController<R>,
) -> bool {
    debug!(?cmd, "control command");
    let has_current = controller.state().current_index.is_some();
    match cmd {
        ControlCmd::Quit => return true,
        ControlCmd::Play => {
            if !has_current {
                controller.play(app.selected);
            } else if !controller.state().is_playing {
                controller.toggle_play_pause();
            }
        }
        ControlCmd::Pause => {
            if controller.state().is_playing {
                controller.toggle_play_pause();
            }
        }
        ControlCmd::PlayPause => {
            if has_current {
                controller.toggle_play_pause();
            } else {
                controller.play(app.selected);
            }
        }
        ControlCmd::Stop => controller.stop(),
        ControlCmd::Next => controller.next(),
        ControlCmd::Prev => controller.previous(),
    }
    false
}

/// Apply one key press. Returns true when the app should quit.
pub fn handle_key_event<R: MediaResource>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut PlaybackController<R>,
    control_tx: &mpsc::Sender<ControlCmd>,
    state: &mut EventLoopState,
) -> bool {
    if app.prompt.is_some() {
        state.pending_gg = false;
        handle_prompt_key(key, settings, app, controller);
        return false;
    }

    let len = controller.playlist().len();
    let seek_step = settings.controls.seek_step_seconds as f64;
    let volume_step = settings.controls.volume_step;

    match key.code {
        KeyCode::Char('q') => {
            state.pending_gg = false;
            return true;
        }
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            state.pending_gg = false;
            app.last(len);
        }
        KeyCode::Char('j') | KeyCode::Down => {
            state.pending_gg = false;
            app.next(len);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.pending_gg = false;
            app.prev(len);
        }
        KeyCode::Enter => {
            state.pending_gg = false;
            controller.play(app.selected);
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            state.pending_gg = false;
            // Behave like MPRIS PlayPause.
            let _ = control_tx.send(ControlCmd::PlayPause);
        }
        KeyCode::Char('l') => {
            state.pending_gg = false;
            let _ = control_tx.send(ControlCmd::Next);
        }
        KeyCode::Char('h') => {
            state.pending_gg = false;
            let _ = control_tx.send(ControlCmd::Prev);
        }
        KeyCode::Char('L') => {
            state.pending_gg = false;
            controller.seek_by(seek_step);
        }
        KeyCode::Char('H') => {
            state.pending_gg = false;
            controller.seek_by(-seek_step);
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            state.pending_gg = false;
            controller.set_volume(controller.state().volume + volume_step);
        }
        KeyCode::Char('-') => {
            state.pending_gg = false;
            controller.set_volume(controller.state().volume - volume_step);
        }
        KeyCode::Char('d') | KeyCode::Char('x') | KeyCode::Delete => {
            state.pending_gg = false;
            controller.remove_track(app.selected);
            app.clamp(controller.playlist().len());
        }
        KeyCode::Char('a') => {
            state.pending_gg = false;
            app.open_prompt();
        }
        KeyCode::Char(_) => {
            // g pending should clear on any other printable char
            state.pending_gg = false;
        }
        _ => {}
    }

    false
}

fn handle_prompt_key<R: MediaResource>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut PlaybackController<R>,
) {
    match key.code {
        KeyCode::Esc => {
            app.take_prompt();
        }
        KeyCode::Backspace => app.prompt_pop(),
        KeyCode::Enter => {
            let line = app.take_prompt().unwrap_or_default();
            let selection = library::split_selection(&line);
            if selection.is_empty() {
                return;
            }
            let files = library::select(&selection, &settings.library);
            let started = controller.add_files(files);
            info!(requested = selection.len(), probing = started, "files added from prompt");
        }
        KeyCode::Char(c) if !c.is_control() => app.prompt_push(c),
        _ => {}
    }
}
