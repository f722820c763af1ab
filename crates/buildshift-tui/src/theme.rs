//! Color palette for the BuildShift TUI.

use ratatui::style::{Color, Modifier, Style};

use buildshift_core::types::TaskStatus;
use buildshift_data::rate::RankTier;

/// Color palette used by every panel.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Primary headers and focused borders
    pub header: Color,
    /// Hotkey hints
    pub hotkey: Color,
    /// Normal text
    pub text: Color,
    /// Secondary text (timestamps, dim info)
    pub text_dim: Color,
    /// Unfocused borders
    pub border_dim: Color,
    /// Status: running/success
    pub status_ok: Color,
    /// Status: paused/warning
    pub status_warning: Color,
    /// Status: error
    pub status_error: Color,
    /// Gold tier (leaderboard rank 1)
    pub tier_gold: Color,
    /// Silver tier (rank 2)
    pub tier_silver: Color,
    /// Bronze tier (rank 3)
    pub tier_bronze: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            header: Color::Cyan,
            hotkey: Color::Yellow,
            text: Color::White,
            text_dim: Color::Gray,
            border_dim: Color::DarkGray,
            status_ok: Color::Green,
            status_warning: Color::Yellow,
            status_error: Color::Red,
            tier_gold: Color::Rgb(255, 215, 0),
            tier_silver: Color::Rgb(192, 192, 192),
            tier_bronze: Color::Rgb(205, 127, 50),
        }
    }
}

impl Theme {
    /// Color for a leaderboard rank tier.
    pub fn tier_color(&self, tier: RankTier) -> Color {
        match tier {
            RankTier::Gold => self.tier_gold,
            RankTier::Silver => self.tier_silver,
            RankTier::Bronze => self.tier_bronze,
            RankTier::Standard => self.text,
        }
    }

    /// Style for a leaderboard row at a 0-based rank.
    ///
    /// The top three render bold in their tier color; deeper ranks fade by
    /// the tier emphasis factor down to a gray floor.
    pub fn rank_style(&self, rank: usize) -> Style {
        let tier = RankTier::for_rank(rank);
        if tier != RankTier::Standard {
            return Style::default()
                .fg(self.tier_color(tier))
                .add_modifier(Modifier::BOLD);
        }

        let emphasis = RankTier::emphasis(rank);
        let level = (255.0 * emphasis) as u8;
        Style::default().fg(Color::Rgb(level, level, level))
    }

    /// Color for a machine task status.
    pub fn status_color(&self, status: TaskStatus) -> Color {
        match status {
            TaskStatus::Idle => self.text_dim,
            TaskStatus::Running => self.status_ok,
            TaskStatus::Paused => self.status_warning,
        }
    }
}
