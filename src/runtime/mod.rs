use std::env;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::{App, PlaybackController};
use crate::audio::AudioPlayer;
use crate::library::UrlRegistry;
use crate::logging;
use crate::mpris::ControlCmd;

mod event_loop;
mod mpris_sync;
mod settings;
mod startup;


pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, fallback_reason) = settings::load_settings();
    let _log_guard = logging::init_logging(&settings.logging);
    if let Some(reason) = fallback_reason {
        warn!("{reason}");
    }
    info!(version = env!("CARGO_PKG_VERSION"), "playdeck starting");

    let files = startup::initial_selection(env::args().skip(1), &settings);

    let audio_player = AudioPlayer::new(settings.audio.clone())?;
    let mut controller =
        PlaybackController::new(audio_player, UrlRegistry::new(), settings.audio.initial_volume);
    controller.add_files(files);
    let mut app = App::new();

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx.clone());

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::new();

        event_loop::run(
            &mut terminal,
            &settings,
            &mut app,
            &mut controller,
            &mpris,
            &control_tx,
            &control_rx,
            &mut state,
        )
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    controller.shutdown(Duration::from_millis(settings.audio.quit_fade_out_ms));
    if let Err(e) = &run_result {
        warn!(error = %e, "event loop ended with an error");
    }
    info!("playdeck stopped");

    run_result
}
