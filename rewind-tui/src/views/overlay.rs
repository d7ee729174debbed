//! Prompt and modal overlays.

use crate::state::{App, Modal, Prompt};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use rewind_player::TickScheduler;

pub fn render_prompt<S: TickScheduler>(f: &mut Frame<'_>, app: &App<S>, prompt: &Prompt) {
    let area = centered_rect(50, 3, f.size());
    let block = Block::default()
        .title(format!("{} (Enter to jump, Esc to cancel)", prompt.kind.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border_focus));
    let inner = block.inner(area);

    f.render_widget(Clear, area);
    f.render_widget(block, area);
    f.render_widget(&prompt.input, inner);
}

pub fn render_modal<S: TickScheduler>(f: &mut Frame<'_>, app: &App<S>, modal: &Modal) {
    let height = modal.message.lines().count() as u16 + 2;
    let area = centered_rect(60, height, f.size());
    let paragraph = Paragraph::new(modal.message.as_str())
        .style(Style::default().fg(app.theme.text))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(modal.title.as_str())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border_focus)),
        );

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

/// A rect `percent_x` wide and `height` rows tall, centered in `area`.
pub fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let height = height.min(area.height);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fits_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(50, 3, outer);
        assert_eq!(inner.height, 3);
        assert_eq!(inner.width, 50);
        assert_eq!(inner.y, 18);

        let tiny = centered_rect(50, 10, Rect::new(0, 0, 20, 4));
        assert!(tiny.height <= 4);
    }
}
