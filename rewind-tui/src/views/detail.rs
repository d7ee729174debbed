//! Current step fields and the JSON pane.

use crate::state::{App, DetailTab};
use crate::theme::SynthBruteTheme;
use crate::widgets::{DetailPanel, JsonHighlighter};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Span,
    Frame,
};
use rewind_core::{ReplayStep, SourceEvent};
use rewind_player::{ReplayController, TickScheduler};
use serde_json::Value;

pub fn render<S: TickScheduler>(
    f: &mut Frame<'_>,
    app: &App<S>,
    controller: &ReplayController,
    area: Rect,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(11), Constraint::Min(0)])
        .split(area);

    let theme = &app.theme;
    let fields = controller
        .current_step()
        .map(|step| step_fields(step, theme))
        .unwrap_or_else(|| vec![("Status", Span::raw("waiting for run data"))]);

    DetailPanel {
        title: "Step",
        fields,
        label_style: Style::default().fg(theme.secondary),
        border_style: Style::default().fg(theme.border),
    }
    .render(f, rows[0]);

    let json = match app.detail_tab {
        DetailTab::Record => controller
            .current_step()
            .map(|step| step.data.raw_json())
            .unwrap_or(Value::Null),
        DetailTab::State => serde_json::to_value(controller.current_step_data().to_owned_data())
            .unwrap_or(Value::Null),
    };
    let title = format!("{} [Tab]", app.detail_tab.title());

    highlighter(theme).render(f, rows[1], &title, &json);
}

fn highlighter(theme: &SynthBruteTheme) -> JsonHighlighter {
    JsonHighlighter {
        key_color: theme.primary,
        string_color: theme.success,
        number_color: theme.tertiary,
        literal_color: theme.secondary,
        punct_color: theme.text_dim,
    }
}

fn step_fields(step: &ReplayStep, theme: &SynthBruteTheme) -> Vec<(&'static str, Span<'static>)> {
    let mut fields = vec![
        ("Step", Span::raw((step.index + 1).to_string())),
        ("Id", Span::raw(step.id.clone())),
        ("Time", Span::raw(display_or_dash(&step.timestamp))),
        ("Agent", Span::raw(step.agent_role.clone().unwrap_or_else(|| "-".to_string()))),
        ("Title", Span::raw(step.title.clone())),
    ];

    match &step.data {
        SourceEvent::Memory(memory) => {
            if let Some(namespace) = &memory.namespace {
                fields.push(("Namespace", Span::raw(namespace.clone())));
            }
        }
        SourceEvent::Compliance(event) => {
            let verdict = match event.passed {
                Some(true) => Span::styled("passed", Style::default().fg(theme.success)),
                Some(false) => Span::styled("failed", Style::default().fg(theme.error)),
                None => Span::raw("-"),
            };
            fields.push(("Verdict", verdict));
            if let Some(score) = event.risk_score {
                fields.push((
                    "Risk",
                    Span::styled(format!("{:.0}", score), Style::default().fg(theme.risk_color(score))),
                ));
            }
            if !event.reason_codes.is_empty() {
                fields.push(("Reasons", Span::raw(event.reason_codes.join(", "))));
            }
        }
        SourceEvent::X402(request) => {
            fields.push((
                "Status",
                Span::styled(
                    request.status.to_string(),
                    Style::default().fg(theme.x402_color(request.status)),
                ),
            ));
            fields.push((
                "Linked",
                Span::raw(format!(
                    "{} memory, {} compliance",
                    request.linked_memory_ids.len(),
                    request.linked_compliance_ids.len()
                )),
            ));
        }
        SourceEvent::ToolCall(call) => {
            let outcome = if call.is_failure() {
                Span::styled("failed", Style::default().fg(theme.error))
            } else {
                Span::styled("ok", Style::default().fg(theme.success))
            };
            fields.push(("Outcome", outcome));
            if let Some(duration) = call.payload.duration_ms {
                fields.push(("Duration", Span::raw(format!("{} ms", duration))));
            }
            if let Some(error) = &call.payload.error {
                fields.push(("Error", Span::styled(error.clone(), Style::default().fg(theme.error))));
            }
        }
    }

    fields.push(("Summary", Span::raw(step.description.clone())));
    fields
}

fn display_or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}
