//! Overview panel: machine status counts, leaderboard podium, board summary.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use crate::data::DashboardData;
use crate::theme::Theme;
use crate::view::View;

/// The overview/summary panel.
pub struct OverviewPanel<'a> {
    data: &'a DashboardData,
    theme: &'a Theme,
}

impl<'a> OverviewPanel<'a> {
    pub fn new(data: &'a DashboardData, theme: &'a Theme) -> Self {
        Self { data, theme }
    }

    fn build_lines(&self) -> Vec<Line<'static>> {
        let theme = self.theme;
        let mut lines = Vec::new();

        // Machines summary
        let (idle, running, paused) = self.data.machines.status_counts();
        lines.push(Line::from(Span::styled(
            "Machines".to_string(),
            Style::default().fg(theme.header).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(
                format!("{running} running "),
                Style::default().fg(theme.status_ok),
            ),
            Span::styled(
                format!("{paused} paused "),
                Style::default().fg(theme.status_warning),
            ),
            Span::styled(format!("{idle} idle"), Style::default().fg(theme.text_dim)),
        ]));
        lines.push(Line::default());

        // Leaderboard podium
        lines.push(Line::from(Span::styled(
            "Leaderboard".to_string(),
            Style::default().fg(theme.header).add_modifier(Modifier::BOLD),
        )));
        let podium = self.data.leaderboard.window.items();
        if podium.is_empty() {
            lines.push(Line::from(Span::styled(
                "  no entries yet",
                Style::default().fg(theme.text_dim),
            )));
        }
        for (rank, ranked) in podium.iter().take(3).enumerate() {
            lines.push(Line::from(vec![
                Span::raw(format!("  {}. ", rank + 1)),
                Span::styled(
                    format!("{:<20}", ranked.entry.user),
                    theme.rank_style(rank),
                ),
                Span::styled(
                    ranked.rate.to_string(),
                    Style::default().fg(theme.text_dim),
                ),
            ]));
        }
        lines.push(Line::default());

        // Task board summary
        let total = self.data.tasks.all.len();
        let open = self.data.tasks.all.iter().filter(|t| !t.completed).count();
        lines.push(Line::from(Span::styled(
            "Task board".to_string(),
            Style::default().fg(theme.header).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("  {open} open of {total} tasks"),
            Style::default().fg(theme.text),
        )));
        lines.push(Line::default());

        // View hints
        let hints = View::ALL
            .iter()
            .map(|v| v.hotkey_hint())
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(Line::from(Span::styled(
            hints,
            Style::default().fg(theme.hotkey),
        )));

        lines
    }
}

impl Widget for OverviewPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Overview ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.theme.border_dim));

        let lines = self.build_lines();
        Paragraph::new(lines).block(block).render(area, buf);
    }
}
