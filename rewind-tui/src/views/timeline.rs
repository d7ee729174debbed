//! Timeline list.

use crate::state::App;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};
use rewind_core::ReplayStep;
use rewind_player::{ReplayController, TickScheduler};

pub fn render<S: TickScheduler>(
    f: &mut Frame<'_>,
    app: &App<S>,
    controller: &ReplayController,
    area: Rect,
) {
    let theme = &app.theme;
    let cursor = controller.current_step_index();

    let items: Vec<ListItem> = controller
        .timeline()
        .steps()
        .iter()
        .map(|step| {
            let replayed = step.index <= cursor;
            let text_style = if replayed {
                Style::default().fg(theme.text)
            } else {
                Style::default().fg(theme.text_dim)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>4} ", step.index + 1), Style::default().fg(theme.text_dim)),
                Span::styled(
                    format!("{:<10} ", step.step_type.label()),
                    Style::default().fg(theme.step_color(step.step_type)),
                ),
                Span::styled(
                    if step.is_error() { "! " } else { "  " },
                    Style::default().fg(theme.error),
                ),
                Span::styled(list_label(step), text_style),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    if !controller.timeline().is_empty() {
        state.select(Some(cursor));
    }

    let title = format!("Timeline ({} steps)", controller.total_steps());
    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(theme.bg_highlight)
                .fg(theme.primary)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");
    f.render_stateful_widget(list, area, &mut state);
}

fn list_label(step: &ReplayStep) -> String {
    match &step.agent_role {
        Some(role) => format!("[{}] {}", role, step.title),
        None => step.title.clone(),
    }
}
