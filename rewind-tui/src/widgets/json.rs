//! Line-oriented highlighting for pretty-printed JSON.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use serde_json::Value;

pub struct JsonHighlighter {
    pub key_color: Color,
    pub string_color: Color,
    pub number_color: Color,
    pub literal_color: Color,
    pub punct_color: Color,
}

impl JsonHighlighter {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect, title: &str, value: &Value) {
        let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string());
        let paragraph = Paragraph::new(self.highlight(&pretty))
            .block(Block::default().title(title.to_string()).borders(Borders::ALL))
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    pub fn highlight(&self, content: &str) -> Text<'static> {
        Text::from(
            content
                .lines()
                .map(|line| self.highlight_line(line))
                .collect::<Vec<_>>(),
        )
    }

    fn highlight_line(&self, line: &str) -> Line<'static> {
        let mut spans: Vec<Span<'static>> = Vec::new();
        let mut chars = line.chars().peekable();

        while let Some(ch) = chars.peek().copied() {
            if ch == '"' {
                chars.next();
                let mut value = String::from('"');
                let mut escaped = false;
                for next in chars.by_ref() {
                    value.push(next);
                    if escaped {
                        escaped = false;
                    } else if next == '\\' {
                        escaped = true;
                    } else if next == '"' {
                        break;
                    }
                }
                let is_key = chars.clone().find(|c| !c.is_whitespace()) == Some(':');
                let color = if is_key {
                    self.key_color
                } else {
                    self.string_color
                };
                spans.push(Span::styled(value, Style::default().fg(color)));
                continue;
            }

            if ch == '-' || ch.is_ascii_digit() {
                let mut number = String::new();
                while let Some(next) = chars.peek().copied() {
                    if next.is_ascii_digit() || matches!(next, '-' | '+' | '.' | 'e' | 'E') {
                        number.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                spans.push(Span::styled(number, Style::default().fg(self.number_color)));
                continue;
            }

            if ch.is_ascii_alphabetic() {
                let mut word = String::new();
                while let Some(next) = chars.peek().copied() {
                    if next.is_ascii_alphabetic() {
                        word.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                spans.push(Span::styled(word, Style::default().fg(self.literal_color)));
                continue;
            }

            if matches!(ch, '{' | '}' | '[' | ']' | ':' | ',') {
                spans.push(Span::styled(
                    ch.to_string(),
                    Style::default().fg(self.punct_color),
                ));
            } else {
                spans.push(Span::raw(ch.to_string()));
            }
            chars.next();
        }

        Line::from(spans)
    }
}
