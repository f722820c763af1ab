//! Notion task board panel.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use crate::data::TasksState;
use crate::theme::Theme;

/// The task board view panel.
pub struct TasksPanel<'a> {
    state: &'a TasksState,
    theme: &'a Theme,
    /// Search buffer shown while the filter input is active
    search_active: bool,
}

impl<'a> TasksPanel<'a> {
    pub fn new(state: &'a TasksState, theme: &'a Theme) -> Self {
        Self {
            state,
            theme,
            search_active: false,
        }
    }

    /// Mark the search field as receiving input.
    pub fn search_active(mut self, active: bool) -> Self {
        self.search_active = active;
        self
    }

    fn filter_line(&self) -> Line<'static> {
        let theme = self.theme;
        let filter = &self.state.filter;

        let mut spans = vec![Span::styled(
            format!("sort: {}  ", self.state.sort.label()),
            Style::default().fg(theme.hotkey),
        )];

        match &filter.status {
            Some(status) => spans.push(Span::styled(
                format!("status: {status}  "),
                Style::default().fg(theme.hotkey),
            )),
            None => spans.push(Span::styled(
                "status: all  ".to_string(),
                Style::default().fg(theme.text_dim),
            )),
        }

        if filter.hide_completed {
            spans.push(Span::styled(
                "hiding done  ".to_string(),
                Style::default().fg(theme.hotkey),
            ));
        }

        let search = if self.search_active {
            format!("search: {}_", filter.search)
        } else if filter.search.trim().is_empty() {
            "search: (press /)".to_string()
        } else {
            format!("search: {}", filter.search)
        };
        spans.push(Span::styled(
            search,
            if self.search_active {
                Style::default().fg(theme.text)
            } else {
                Style::default().fg(theme.text_dim)
            },
        ));

        Line::from(spans)
    }

    fn build_lines(&self) -> Vec<Line<'static>> {
        let theme = self.theme;
        let mut lines = vec![self.filter_line(), Line::default()];

        if self.state.loading {
            lines.push(Line::from(Span::styled(
                "Loading task board...",
                Style::default().fg(theme.text_dim),
            )));
            return lines;
        }

        if self.state.placeholder {
            lines.push(Line::from(Span::styled(
                "Notion unreachable, showing sample board. Press 'r' to retry.",
                Style::default().fg(theme.status_warning),
            )));
        }

        if self.state.window.is_empty() {
            lines.push(Line::from(Span::styled(
                "No tasks match the current filter.",
                Style::default().fg(theme.text_dim),
            )));
            return lines;
        }

        for (idx, task) in self.state.window.visible().iter().enumerate() {
            let selected = idx == self.state.selected;
            let cursor = if selected { "> " } else { "  " };

            let title_style = if task.completed {
                Style::default()
                    .fg(theme.text_dim)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else if task.highlighted {
                Style::default()
                    .fg(theme.hotkey)
                    .add_modifier(Modifier::BOLD)
            } else if selected {
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text)
            };

            let due = task.due_date.clone().unwrap_or_else(|| "-".to_string());
            let assignees = task
                .assigned_to
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");

            lines.push(Line::from(vec![
                Span::raw(cursor.to_string()),
                Span::styled(format!("{:<36}", task.title), title_style),
                Span::styled(
                    format!("{:<14}", task.status),
                    Style::default().fg(theme.header),
                ),
                Span::styled(format!("{due:<12}"), Style::default().fg(theme.text_dim)),
                Span::styled(assignees, Style::default().fg(theme.text_dim)),
            ]));

            if self.state.expanded == Some(idx) {
                for body_line in task.description.lines() {
                    lines.push(Line::from(Span::styled(
                        format!("      {body_line}"),
                        Style::default().fg(theme.text_dim),
                    )));
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

impl Widget for TasksPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = format!(
            " Tasks ({}/{}) ",
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::placeholder_tasks;

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
    fn test_board_rows_show_status_and_assignee() {
        let mut state = TasksState::default();
        let tag = state.generation.begin();
        state.apply_fetch(tag, Ok(placeholder_tasks()));

        let theme = Theme::default();
        let text = rendered_text(&TasksPanel::new(&state, &theme).build_lines());
        assert!(text.contains("Calibrate counter line A"));
        assert!(text.contains("In Progress"));
        assert!(text.contains("Alice Johnson"));
    }

    #[test]
    fn test_placeholder_banner_after_failed_fetch() {
        let mut state = TasksState::default();
        let tag = state.generation.begin();
        state.apply_fetch(
            tag,
            Err(buildshift_core::error::BuildShiftError::request(
                "/notion",
                "down",
            )),
        );

        let theme = Theme::default();
        let text = rendered_text(&TasksPanel::new(&state, &theme).build_lines());
        assert!(text.contains("sample board"));
    }

    #[test]
    fn test_expanded_task_shows_description() {
        let mut state = TasksState::default();
        let tag = state.generation.begin();
        state.apply_fetch(tag, Ok(placeholder_tasks()));
        state.expanded = Some(0);

        let theme = Theme::default();
        let text = rendered_text(&TasksPanel::new(&state, &theme).build_lines());
        assert!(text.contains("Status:"));
    }
}
