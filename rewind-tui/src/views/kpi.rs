//! Counts of what has been replayed so far.

use crate::state::App;
use crate::widgets::KpiTile;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    Frame,
};
use rewind_core::StepType;
use rewind_player::{ReplayController, TickScheduler};

pub fn render<S: TickScheduler>(
    f: &mut Frame<'_>,
    app: &App<S>,
    controller: &ReplayController,
    area: Rect,
) {
    let counts = controller.step_counts();
    let theme = &app.theme;

    let tiles = [
        (StepType::Memory.label(), counts.memory, theme.steps.memory),
        (StepType::Compliance.label(), counts.compliance, theme.steps.compliance),
        (StepType::X402.label(), counts.x402, theme.steps.x402),
        (StepType::ToolCall.label(), counts.tool_calls, theme.steps.tool_call),
        ("Errors", counts.errors, theme.error),
    ];

    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, tiles.len() as u32); 5])
        .split(area);

    for ((label, value, color), cell) in tiles.into_iter().zip(cells.iter()) {
        KpiTile {
            label,
            value,
            style: Style::default().fg(color),
        }
        .render(f, *cell);
    }
}
