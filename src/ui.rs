//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`. It only
//! reads controller state; keys are handled by the runtime event loop.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::{App, PlaybackController, Transport};
use crate::audio::MediaResource;
use crate::config::{ControlsSettings, UiSettings};
use crate::library::{Track, format_time};

const EMPTY_PLAYLIST: &str = "No songs in playlist\nAdd audio files to get started";

/// Render the controls help text, incorporating the seek step.
fn controls_text(seek_seconds: u64) -> String {
    [
        "[j/k] up/down".to_string(),
        "[gg/G] top/bottom".to_string(),
        "[enter] play selected".to_string(),
        "[space/p] play/pause".to_string(),
        "[h/l] prev/next".to_string(),
        format!("[H/L] seek -/+{seek_seconds}s"),
        "[-/+] volume".to_string(),
        "[d] remove".to_string(),
        "[a] add files".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

fn transport_label(transport: Transport) -> &'static str {
    match transport {
        Transport::Stopped => "Stopped",
        Transport::Loading => "Loading",
        Transport::Paused => "Paused",
        Transport::Playing => "Playing",
    }
}

/// One playlist row: position (or a marker for the current track), name, length.
fn row_text(
    index: usize,
    track: &Track,
    current: Option<usize>,
    playing: bool,
    show_numbers: bool,
) -> String {
    let lead = match current {
        Some(c) if c == index && playing => " ▶ ".to_string(),
        Some(c) if c == index => " ‖ ".to_string(),
        _ if show_numbers => format!("{:>2}.", index + 1),
        _ => "   ".to_string(),
    };
    format!(
        "{lead} {}  ({})",
        track.display_name,
        format_time(track.duration.as_secs_f64())
    )
}

fn volume_text(volume: f32) -> String {
    format!("Vol {:>3}%", (volume * 100.0).round() as u32)
}

/// Start, end and selected offset of the slice of rows that fits in `height`,
/// keeping the selection centered when possible.
fn visible_window(total: usize, height: usize, selected: usize) -> (usize, usize, usize) {
    if total <= height || height == 0 {
        return (0, total, selected.min(total.saturating_sub(1)));
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height, selected - start)
}

fn padded(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

/// Render the entire UI into the provided `frame`.
pub fn draw<R: MediaResource>(
    frame: &mut Frame,
    app: &App,
    controller: &PlaybackController<R>,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let prompt_height = if app.prompt.is_some() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(prompt_height),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" playdeck ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    draw_now_playing(frame, controller, chunks[1]);
    draw_playlist(frame, app, controller, ui_settings, chunks[2]);

    if let Some(prompt) = &app.prompt {
        let input = Paragraph::new(format!("{prompt}_"))
            .block(padded(" add files (enter adds, esc cancels) "));
        frame.render_widget(input, chunks[3]);
    }

    let footer = Paragraph::new(controls_text(controls_settings.seek_step_seconds))
        .block(padded(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}

fn draw_now_playing<R: MediaResource>(
    frame: &mut Frame,
    controller: &PlaybackController<R>,
    area: Rect,
) {
    let state = controller.state();
    let block = padded(" now playing ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    let title = controller
        .current_track()
        .map(|t| t.display_name.as_str())
        .unwrap_or("-");
    let line = format!(
        "{} • {} • {}",
        transport_label(controller.transport()),
        title,
        volume_text(state.volume)
    );
    frame.render_widget(Paragraph::new(line), rows[0]);

    let label = format!(
        "{} / {}",
        format_time(state.current_time),
        format_time(state.duration)
    );
    let gauge = Gauge::default()
        .gauge_style(Style::default().add_modifier(Modifier::REVERSED))
        .ratio(state.progress())
        .label(label);
    frame.render_widget(gauge, rows[1]);
}

fn draw_playlist<R: MediaResource>(
    frame: &mut Frame,
    app: &App,
    controller: &PlaybackController<R>,
    ui_settings: &UiSettings,
    area: Rect,
) {
    let playlist = controller.playlist();
    let title = format!(" playlist ({}) ", playlist.len());

    if playlist.is_empty() {
        let empty = Paragraph::new(EMPTY_PLAYLIST)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(empty, area);
        return;
    }

    let state = controller.state();
    let height = area.height.saturating_sub(2) as usize;
    let (start, end, selected_in_view) = visible_window(playlist.len(), height, app.selected);

    let items: Vec<ListItem> = playlist
        .iter()
        .enumerate()
        .skip(start)
        .take(end - start)
        .map(|(i, track)| {
            ListItem::new(row_text(
                i,
                track,
                state.current_index,
                state.is_playing,
                ui_settings.show_track_numbers,
            ))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut list_state = ListState::default();
    list_state.select(Some(selected_in_view));
    frame.render_stateful_widget(list, area, &mut list_state);
}
