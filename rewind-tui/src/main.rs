//! REWIND TUI entry point.

use crossterm::{
    event::{self, Event as CrosstermEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use rewind_player::TokioScheduler;
use rewind_tui::config::TuiConfig;
use rewind_tui::error::TuiError;
use rewind_tui::events::TuiEvent;
use rewind_tui::keys::{map_key, map_prompt_key};
use rewind_tui::logging::init_tracing;
use rewind_tui::notifications::NotificationLevel;
use rewind_tui::persistence;
use rewind_tui::poller::spawn_poller;
use rewind_tui::source;
use rewind_tui::state::App;
use rewind_tui::views::render_view;
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;

/// Redraw interval, so autoplay shows up without input.
const FRAME_INTERVAL: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<(), TuiError> {
    let config = TuiConfig::load()?;
    init_tracing(&config.error_log_path)?;

    let run_source = source::from_config(&config)?;
    let mut app = App::new(config, run_source.describe(), TokioScheduler::new()?)?;
    tracing::info!(
        run_id = %app.config.run_id,
        source = %app.source_label,
        session_id = %app.session.id(),
        "REWIND TUI starting"
    );

    match persistence::load_for_run(&app.config.persistence_path, &app.config.run_id) {
        Ok(Some(state)) => app.restore_on_load(state),
        Ok(None) => {}
        Err(err) => {
            tracing::warn!(error = %err, "Ignoring unreadable persisted state");
            app.notify(NotificationLevel::Warning, format!("Saved position ignored: {}", err));
        }
    }

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard;

    let (event_tx, mut event_rx) = mpsc::channel::<TuiEvent>(256);
    spawn_input_reader(event_tx.clone());
    let poller = spawn_poller(
        run_source,
        Duration::from_millis(app.config.refresh_interval_ms),
        app.config.reconnect.clone(),
        event_tx.clone(),
    );

    let mut ticker = tokio::time::interval(FRAME_INTERVAL);

    loop {
        terminal.draw(|f| render_view(f, &app))?;

        tokio::select! {
            _ = ticker.tick() => {}
            Some(event) = event_rx.recv() => {
                if handle_event(&mut app, event) {
                    break;
                }
            }
        }
    }

    poller.abort();
    app.session.pause();
    if let Err(err) = persistence::save(&app.config.persistence_path, &app.persisted_state()) {
        tracing::error!(error = %err, "Failed to save replay position");
    }
    tracing::info!(run_id = %app.config.run_id, "REWIND TUI exiting");

    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

fn spawn_input_reader(sender: mpsc::Sender<TuiEvent>) {
    std::thread::spawn(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(200)) {
            let sent = match event::read() {
                Ok(CrosstermEvent::Key(key)) => sender.blocking_send(TuiEvent::Input(key)),
                Ok(CrosstermEvent::Resize(width, height)) => {
                    sender.blocking_send(TuiEvent::Resize { width, height })
                }
                _ => Ok(()),
            };
            if sent.is_err() {
                break;
            }
        }
    });
}

/// Returns `true` when the app should quit.
fn handle_event(app: &mut App, event: TuiEvent) -> bool {
    match event {
        TuiEvent::Input(key) if key.kind == KeyEventKind::Release => {}
        TuiEvent::Input(key) => {
            if app.prompt.is_some() {
                match map_prompt_key(key) {
                    Some(action) => return app.apply(action),
                    None => {
                        app.prompt_input(key);
                    }
                }
            } else if let Some(action) = map_key(key) {
                return app.apply(action);
            }
        }
        TuiEvent::Sources(sources) => app.apply_sources(sources),
        TuiEvent::SourceUnchanged => app.source_unchanged(),
        TuiEvent::SourceError(message) => app.source_failed(message),
        TuiEvent::Resize { .. } => {}
    }
    false
}
