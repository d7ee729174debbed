//! View rendering.

pub mod detail;
pub mod kpi;
pub mod overlay;
pub mod timeline;

use crate::notifications::NotificationLevel;
use crate::state::{App, SourceStatus};
use crate::widgets::PlaybackBar;
use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use rewind_player::{ReplayController, TickScheduler};

/// Seconds a notification stays in the footer.
const NOTIFICATION_TTL_SECS: i64 = 5;

pub fn render_view<S: TickScheduler>(f: &mut Frame<'_>, app: &App<S>) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(f.size());

    app.session.inspect(|controller| {
        render_header(f, app, controller, layout[0]);
        render_progress(f, app, controller, layout[1]);
        render_body(f, app, controller, layout[2]);
    });
    render_footer(f, app, layout[3]);

    if let Some(prompt) = &app.prompt {
        overlay::render_prompt(f, app, prompt);
    } else if let Some(modal) = &app.modal {
        overlay::render_modal(f, app, modal);
    }
}

fn render_header<S: TickScheduler>(
    f: &mut Frame<'_>,
    app: &App<S>,
    controller: &ReplayController,
    area: Rect,
) {
    let theme = &app.theme;
    let (state, state_color) = if controller.is_playing() {
        ("PLAYING", theme.success)
    } else {
        ("PAUSED", theme.warning)
    };
    let (source, source_color) = match &app.source_status {
        SourceStatus::Connecting => ("connecting".to_string(), theme.text_dim),
        SourceStatus::Live { updated_at } => (
            format!("live {}", updated_at.format("%H:%M:%S")),
            theme.success,
        ),
        SourceStatus::Failed(_) => ("fetch failing".to_string(), theme.error),
    };

    let line = Line::from(vec![
        Span::styled(
            "REWIND",
            Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" | Run: {} | ", app.config.run_id)),
        Span::styled(state, Style::default().fg(state_color)),
        Span::raw(format!(" | {}x | ", controller.playback_speed())),
        Span::styled(source, Style::default().fg(source_color)),
        Span::styled(
            format!(" | {}", app.source_label),
            Style::default().fg(theme.text_dim),
        ),
    ]);
    let header = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    );
    f.render_widget(header, area);
}

fn render_progress<S: TickScheduler>(
    f: &mut Frame<'_>,
    app: &App<S>,
    controller: &ReplayController,
    area: Rect,
) {
    let bar = PlaybackBar {
        title: "Playback".to_string(),
        position: controller.current_step_index(),
        total: controller.total_steps(),
        style: Style::default().fg(app.theme.primary).bg(app.theme.bg_highlight),
    };
    bar.render(f, area);
}

fn render_body<S: TickScheduler>(
    f: &mut Frame<'_>,
    app: &App<S>,
    controller: &ReplayController,
    area: Rect,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    timeline::render(f, app, controller, columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(columns[1]);

    kpi::render(f, app, controller, right[0]);
    detail::render(f, app, controller, right[1]);
}

fn render_footer<S: TickScheduler>(f: &mut Frame<'_>, app: &App<S>, area: Rect) {
    let help = "Space play • ←/→ step • e next error • a agent • : step • x export • ? help • q quit";
    let fresh = app
        .notifications
        .back()
        .filter(|note| note.is_fresh(Utc::now(), NOTIFICATION_TTL_SECS));

    let (text, style) = match fresh {
        Some(note) => {
            let color = match note.level {
                NotificationLevel::Info => app.theme.info,
                NotificationLevel::Warning => app.theme.warning,
                NotificationLevel::Error => app.theme.error,
                NotificationLevel::Success => app.theme.success,
            };
            (
                format!("{}: {}", note.level.label(), note.message),
                Style::default().fg(color),
            )
        }
        None => (help.to_string(), Style::default().fg(app.theme.text_dim)),
    };
    let footer = Paragraph::new(text)
        .block(Block::default().borders(Borders::TOP))
        .style(style);
    f.render_widget(footer, area);
}
