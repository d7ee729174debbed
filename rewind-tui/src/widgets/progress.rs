//! Playback position gauge.

use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Gauge},
    Frame,
};

pub struct PlaybackBar {
    pub title: String,
    pub position: usize,
    pub total: usize,
    pub style: Style,
}

impl PlaybackBar {
    /// Fraction of the timeline replayed, counting the cursor step.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            ((self.position + 1) as f64 / self.total as f64).clamp(0.0, 1.0)
        }
    }

    pub fn label(&self) -> String {
        if self.total == 0 {
            "no steps".to_string()
        } else {
            format!("step {} / {}", self.position + 1, self.total)
        }
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let gauge = Gauge::default()
            .block(Block::default().title(self.title.as_str()).borders(Borders::ALL))
            .gauge_style(self.style)
            .ratio(self.ratio())
            .label(self.label());
        f.render_widget(gauge, area);
    }
}
