//! Counter-session analytics chart panel.
//!
//! Counts and durations render as paired horizontal bars per user. Durations
//! are divided by one batch-global divisor so every bar shares a unit label.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use buildshift_data::chart;

use crate::data::AnalyticsState;
use crate::leaderboard_panel::bar_for;
use crate::theme::Theme;

const BAR_WIDTH: usize = 30;

/// The analytics view panel.
pub struct AnalyticsPanel<'a> {
    state: &'a AnalyticsState,
    theme: &'a Theme,
}

impl<'a> AnalyticsPanel<'a> {
    pub fn new(state: &'a AnalyticsState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    fn build_lines(&self) -> Vec<Line<'static>> {
        let theme = self.theme;
        let mut lines = Vec::new();

        if self.state.loading {
            lines.push(Line::from(Span::styled(
                "Loading session data...",
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

        let (points, scale) = chart::build_points(&self.state.samples);
        if points.is_empty() {
            lines.push(Line::from(Span::styled(
                "No data available",
                Style::default().fg(theme.text_dim),
            )));
            return lines;
        }

        lines.push(Line::from(Span::styled(
            format!("counts vs durations ({})", scale.label),
            Style::default().fg(theme.hotkey),
        )));
        lines.push(Line::default());

        let max_count = points.iter().map(|p| p.count).fold(0.0_f64, f64::max);
        let max_duration = points.iter().map(|p| p.duration).fold(0.0_f64, f64::max);

        for point in &points {
            lines.push(Line::from(Span::styled(
                point.label.clone(),
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(vec![
                Span::styled("  count    ".to_string(), Style::default().fg(theme.text_dim)),
                Span::styled(
                    bar_for(point.count, max_count, BAR_WIDTH),
                    Style::default().fg(theme.status_ok),
                ),
                Span::styled(
                    format!(" {:.0}", point.count),
                    Style::default().fg(theme.text),
                ),
            ]));
            lines.push(Line::from(vec![
                Span::styled("  duration ".to_string(), Style::default().fg(theme.text_dim)),
                Span::styled(
                    bar_for(point.duration, max_duration, BAR_WIDTH),
                    Style::default().fg(theme.header),
                ),
                Span::styled(
                    format!(" {:.1}{}", point.duration, scale.label),
                    Style::default().fg(theme.text),
                ),
            ]));
        }

        lines
    }
}

impl Widget for AnalyticsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Analytics ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.theme.border_dim));

        let lines = self.build_lines();
        Paragraph::new(lines).block(block).render(area, buf);
    }
}
