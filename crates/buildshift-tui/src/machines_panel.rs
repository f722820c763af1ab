//! Machine list panel with lifecycle controls.
//!
//! Renders the paged machine list with status indicators, the expandable
//! notes row, and whichever form (add/edit machine, start task) is open.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use crate::data::{MachineFormField, MachinesState, TaskFormField};
use crate::theme::Theme;

/// The machines view panel.
pub struct MachinesPanel<'a> {
    state: &'a MachinesState,
    theme: &'a Theme,
}

impl<'a> MachinesPanel<'a> {
    pub fn new(state: &'a MachinesState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    fn build_lines(&self) -> Vec<Line<'static>> {
        let theme = self.theme;
        let mut lines = Vec::new();

        if let Some(form) = &self.state.form {
            let title = if form.editing {
                "Edit machine"
            } else {
                "Add machine"
            };
            lines.push(Line::from(Span::styled(
                title.to_string(),
                Style::default().fg(theme.header).add_modifier(Modifier::BOLD),
            )));
            lines.push(field_line(
                "Alias",
                &form.alias,
                form.field == MachineFormField::Alias,
                theme,
            ));
            lines.push(field_line(
                "IP",
                &form.ip,
                form.field == MachineFormField::Ip,
                theme,
            ));
            lines.push(Line::from(Span::styled(
                "[Tab] switch field  [Enter] save  [Esc] cancel",
                Style::default().fg(theme.text_dim),
            )));
            lines.push(Line::default());
        }

        if let Some(form) = &self.state.task_form {
            lines.push(Line::from(Span::styled(
                "Start task",
                Style::default().fg(theme.header).add_modifier(Modifier::BOLD),
            )));
            lines.push(field_line(
                "Name",
                &form.name,
                form.field == TaskFormField::Name,
                theme,
            ));
            lines.push(field_line(
                "Notes",
                &form.notes,
                form.field == TaskFormField::Notes,
                theme,
            ));
            lines.push(Line::from(Span::styled(
                "[Tab] switch field  [Enter] start  [Esc] cancel",
                Style::default().fg(theme.text_dim),
            )));
            lines.push(Line::default());
        }

        if self.state.loading {
            lines.push(Line::from(Span::styled(
                "Loading machines...",
                Style::default().fg(theme.text_dim),
            )));
            return lines;
        }

        if let Some(error) = &self.state.error {
            lines.push(Line::from(Span::styled(
                format!("Fetch failed: {error}"),
                Style::default().fg(theme.status_error),
            )));
            lines.push(Line::from(Span::styled(
                "Press 'r' to refresh",
                Style::default().fg(theme.text_dim),
            )));
            return lines;
        }

        if self.state.window.is_empty() {
            lines.push(Line::from(Span::styled(
                "No machines registered. Press 'n' to add one.",
                Style::default().fg(theme.text_dim),
            )));
            return lines;
        }

        for (idx, machine) in self.state.window.visible().iter().enumerate() {
            let status = machine.task_status();
            let selected = idx == self.state.selected;

            let cursor = if selected { "> " } else { "  " };
            let mut spans = vec![
                Span::raw(cursor.to_string()),
                Span::styled(
                    format!("{} ", status.indicator()),
                    Style::default().fg(theme.status_color(status)),
                ),
                Span::styled(
                    format!("{:<20}", machine.display_name()),
                    if selected {
                        Style::default().fg(theme.text).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(theme.text)
                    },
                ),
                Span::styled(
                    format!("{:<16}", machine.ip),
                    Style::default().fg(theme.text_dim),
                ),
            ];

            match &machine.task {
                Some(task) => {
                    spans.push(Span::styled(
                        format!("{} ({})", task.name, status),
                        Style::default().fg(theme.status_color(status)),
                    ));
                    if task.has_notes() {
                        spans.push(Span::styled(
                            "  [space: notes]",
                            Style::default().fg(theme.text_dim),
                        ));
                    }
                }
                None => {
                    spans.push(Span::styled("idle", Style::default().fg(theme.text_dim)));
                }
            }
            lines.push(Line::from(spans));

            if self.state.expanded == Some(idx) {
                if let Some(task) = &machine.task {
                    for note_line in task.notes.lines() {
                        lines.push(Line::from(Span::styled(
                            format!("      {note_line}"),
                            Style::default().fg(theme.text_dim),
                        )));
                    }
                }
            }
        }

        if !self.state.window.is_exhausted() {
            lines.push(Line::from(Span::styled(
                format!(
                    "  ... {} more (scroll down to load)",
                    self.state.window.len() - self.state.window.visible_len()
                ),
                Style::default().fg(theme.text_dim),
            )));
        }

        lines
    }
}

impl Widget for MachinesPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = format!(
            " Machines ({}/{}) ",
            self.state.window.visible_len(),
            self.state.window.len()
        );
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.theme.border_dim));

        let lines = self.build_lines();
        Paragraph::new(lines).block(block).render(area, buf);
    }
}

fn field_line(label: &str, value: &str, active: bool, theme: &Theme) -> Line<'static> {
    let marker = if active { "> " } else { "  " };
    Line::from(vec![
        Span::raw(marker.to_string()),
        Span::styled(format!("{label}: "), Style::default().fg(theme.text_dim)),
        Span::styled(
            format!("{value}{}", if active { "_" } else { "" }),
            Style::default().fg(theme.text),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildshift_core::types::{Machine, Task};

    fn state_with_machines() -> MachinesState {
        let mut state = MachinesState::default();
        let tag = state.generation.begin();
        let mut busy = Machine::new("10.0.0.12", "counter-a");
        busy.task = Some(Task::running("batch-7", "check hopper"));
        state
            .apply_fetch(tag, Ok(vec![busy, Machine::new("10.0.0.13", "counter-b")]));
        state
    }

    fn rendered_text(lines: &[Line<'_>]) -> String {
        lines
            .iter()
            .map(|l| {
                l.spans
                    .iter()
                    .map(|s| s.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_lists_machines_with_status() {
        let state = state_with_machines();
        let theme = Theme::default();
        let text = rendered_text(&MachinesPanel::new(&state, &theme).build_lines());

        assert!(text.contains("counter-a"));
        assert!(text.contains("batch-7 (running)"));
        assert!(text.contains("counter-b"));
        assert!(text.contains("idle"));
    }

    #[test]
    fn test_expanded_row_shows_notes() {
        let mut state = state_with_machines();
        state.expanded = Some(0);
        let theme = Theme::default();
        let text = rendered_text(&MachinesPanel::new(&state, &theme).build_lines());
        assert!(text.contains("check hopper"));
    }

    #[test]
    fn test_error_state_shows_refresh_hint() {
        let mut state = MachinesState::default();
        let tag = state.generation.begin();
        state.apply_fetch(
            tag,
            Err(buildshift_core::error::BuildShiftError::request(
                "/api/get-machines/",
                "connection refused",
            )),
        );
        let theme = Theme::default();
        let text = rendered_text(&MachinesPanel::new(&state, &theme).build_lines());
        assert!(text.contains("Fetch failed"));
        assert!(text.contains("'r' to refresh"));
    }
}
