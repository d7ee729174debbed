//! Single-number KPI tile.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub struct KpiTile<'a> {
    pub label: &'a str,
    pub value: usize,
    pub style: Style,
}

impl<'a> KpiTile<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let paragraph = Paragraph::new(self.value.to_string())
            .alignment(Alignment::Center)
            .style(self.style.add_modifier(Modifier::BOLD))
            .block(Block::default().title(self.label).borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }
}
