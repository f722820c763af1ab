//! Wakeup-payload editor panel.
//!
//! Renders the selected machine's payload as flat pointer/value rows with
//! dirty-state tracking.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use crate::data::EditorState;
use crate::theme::Theme;

/// The payload editor view panel.
pub struct EditorPanel<'a> {
    state: &'a EditorState,
    theme: &'a Theme,
}

impl<'a> EditorPanel<'a> {
    pub fn new(state: &'a EditorState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    fn build_lines(&self) -> Vec<Line<'static>> {
        let theme = self.theme;
        let mut lines = Vec::new();

        let Some(editor) = &self.state.editor else {
            if let Some(error) = &self.state.error {
                lines.push(Line::from(Span::styled(
                    format!("Error: {error}"),
                    Style::default().fg(theme.status_error),
                )));
            }
            lines.push(Line::from(Span::styled(
                "No payload open. Select a machine and press Enter.",
                Style::default().fg(theme.text_dim),
            )));
            return lines;
        };

        if editor.is_dirty() {
            lines.push(Line::from(Span::styled(
                "unsaved changes  [s] save  [u] revert",
                Style::default()
                    .fg(theme.status_warning)
                    .add_modifier(Modifier::BOLD),
            )));
        } else if self.state.saving {
            lines.push(Line::from(Span::styled(
                "Saving...",
                Style::default().fg(theme.text_dim),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "saved  [Enter] edit value",
                Style::default().fg(theme.text_dim),
            )));
        }
        if let Some(error) = &self.state.error {
            lines.push(Line::from(Span::styled(
                format!("Error: {error}"),
                Style::default().fg(theme.status_error),
            )));
        }
        lines.push(Line::default());

        let rows = editor.rows();
        if rows.is_empty() {
            lines.push(Line::from(Span::styled(
                "Payload is empty.",
                Style::default().fg(theme.text_dim),
            )));
            return lines;
        }

        for (idx, (pointer, value)) in rows.iter().enumerate() {
            let at_cursor = idx == self.state.selected_row;
            let marker = if at_cursor { "> " } else { "  " };

            let shown = match (&self.state.editing, at_cursor) {
                (Some(buffer), true) => format!("{buffer}_"),
                _ => value.clone(),
            };

            lines.push(Line::from(vec![
                Span::raw(marker.to_string()),
                Span::styled(
                    format!("{pointer:<40}"),
                    if at_cursor {
                        Style::default().fg(theme.text).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(theme.text_dim)
                    },
                ),
                Span::styled(shown, Style::default().fg(theme.hotkey)),
            ]));
        }

        lines
    }
}

impl Widget for EditorPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = match &self.state.machine_ip {
            Some(ip) => format!(" Payload ({ip}) "),
            None => " Payload ".to_string(),
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.theme.border_dim));

        let lines = self.build_lines();
        Paragraph::new(lines).block(block).render(area, buf);
    }
}
