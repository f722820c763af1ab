//! Leaderboard panel with tier styling and per-user drill-down.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use buildshift_data::chart;

use crate::data::LeaderboardState;
use crate::theme::Theme;

/// The leaderboard view panel.
pub struct LeaderboardPanel<'a> {
    state: &'a LeaderboardState,
    theme: &'a Theme,
}

impl<'a> LeaderboardPanel<'a> {
    pub fn new(state: &'a LeaderboardState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    fn build_lines(&self) -> Vec<Line<'static>> {
        let theme = self.theme;
        let mut lines = vec![
            Line::from(Span::styled(
                format!("sorted by {}  ('s' toggles)", self.state.sort.label()),
                Style::default().fg(theme.hotkey),
            )),
            Line::default(),
        ];

        if self.state.loading {
            lines.push(Line::from(Span::styled(
                "Loading leaderboard...",
                Style::default().fg(theme.text_dim),
            )));
            return lines;
        }

        if self.state.placeholder {
            lines.push(Line::from(Span::styled(
                "Leaderboard unreachable, showing sample data. Press 'r' to retry.",
                Style::default().fg(theme.status_warning),
            )));
            lines.push(Line::default());
        }

        if self.state.window.is_empty() {
            lines.push(Line::from(Span::styled(
                "No leaderboard entries.",
                Style::default().fg(theme.text_dim),
            )));
            return lines;
        }

        for (rank, ranked) in self.state.window.visible().iter().enumerate() {
            let selected = rank == self.state.selected;
            let cursor = if selected { "> " } else { "  " };
            let style = theme.rank_style(rank);

            let medal = match rank {
                0 => "1.",
                1 => "2.",
                2 => "3.",
                _ => "",
            };
            let place = if medal.is_empty() {
                format!("{}.", rank + 1)
            } else {
                medal.to_string()
            };

            lines.push(Line::from(vec![
                Span::raw(cursor.to_string()),
                Span::styled(format!("{place:<4}"), style),
                Span::styled(format!("{:<20}", ranked.entry.user), style),
                Span::styled(
                    format!("{:>8.0}  ", ranked.entry.count),
                    Style::default().fg(theme.text),
                ),
                Span::styled(ranked.rate.to_string(), style.add_modifier(Modifier::BOLD)),
            ]));

            if self.state.expanded == Some(rank) {
                let entry = &ranked.entry;
                let window = match (entry.start, entry.end) {
                    (Some(start), Some(end)) => format!(
                        "{} -> {}",
                        start.format("%Y-%m-%d %H:%M"),
                        end.format("%Y-%m-%d %H:%M")
                    ),
                    _ => "session window unknown".to_string(),
                };
                lines.push(Line::from(Span::styled(
                    format!("      {window}  duration {:.0}s", entry.duration_secs),
                    Style::default().fg(theme.text_dim),
                )));
                if !entry.notes.trim().is_empty() {
                    lines.push(Line::from(Span::styled(
                        format!("      {}", entry.notes),
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

        if let Some(drill) = &self.state.drill {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                format!("Sessions for {} (Esc closes)", drill.user),
                Style::default().fg(theme.header).add_modifier(Modifier::BOLD),
            )));
            if drill.loading {
                lines.push(Line::from(Span::styled(
                    "Loading sessions...",
                    Style::default().fg(theme.text_dim),
                )));
            } else {
                let (points, scale) = chart::build_points(&drill.samples);
                let max = points.iter().map(|p| p.count).fold(0.0_f64, f64::max);
                for point in &points {
                    let bar = bar_for(point.count, max, 24);
                    lines.push(Line::from(vec![
                        Span::styled(
                            format!("  {:<14}", point.label),
                            Style::default().fg(theme.text),
                        ),
                        Span::styled(bar, Style::default().fg(theme.header)),
                        Span::styled(
                            format!(" {:.0} in {:.1}{}", point.count, point.duration, scale.label),
                            Style::default().fg(theme.text_dim),
                        ),
                    ]));
                }
            }
        }

        lines
    }
}

impl Widget for LeaderboardPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = format!(
            " Leaderboard ({}/{}) ",
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

/// A proportional bar of `width` cells for `value` against `max`.
pub(crate) fn bar_for(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 {
        return String::new();
    }
    let filled = ((value / max) * width as f64).round() as usize;
    "█".repeat(filled.min(width))
}
