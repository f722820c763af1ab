//! View types and navigation for the BuildShift TUI.
//!
//! Views represent the different screens/modes available in the dashboard.

use std::fmt;

/// Available views in the BuildShift dashboard.
///
/// Each view represents a distinct screen with its own content and
/// interactions. Views switch on digit hotkeys so that letters stay free for
/// per-view actions (start, pause, kill, and so on), or cycle with Tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Summary of machines, leaderboard, and task board
    #[default]
    Overview,
    /// Machine list with task lifecycle controls
    Machines,
    /// Notion task board with filter and sort
    Tasks,
    /// Counter leaderboard with derived rates
    Leaderboard,
    /// Counter-session analytics chart
    Analytics,
    /// Recipe calculator
    Recipes,
    /// Wakeup-payload editor for the selected machine
    Editor,
}

impl View {
    /// Returns the hotkey character for this view.
    pub fn hotkey(&self) -> char {
        match self {
            View::Overview => '1',
            View::Machines => '2',
            View::Tasks => '3',
            View::Leaderboard => '4',
            View::Analytics => '5',
            View::Recipes => '6',
            View::Editor => '7',
        }
    }

    /// Returns the display title for this view.
    pub fn title(&self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::Machines => "Machines",
            View::Tasks => "Tasks",
            View::Leaderboard => "Leaderboard",
            View::Analytics => "Analytics",
            View::Recipes => "Recipes",
            View::Editor => "Payload",
        }
    }

    /// Returns the hotkey hint for status bar display.
    pub fn hotkey_hint(&self) -> String {
        format!("[{}] {}", self.hotkey(), self.title())
    }

    /// All views in display order (for Tab cycling).
    pub const ALL: [View; 7] = [
        View::Overview,
        View::Machines,
        View::Tasks,
        View::Leaderboard,
        View::Analytics,
        View::Recipes,
        View::Editor,
    ];

    /// Returns the next view in the cycle (for Tab navigation).
    pub fn next(&self) -> View {
        let idx = Self::ALL.iter().position(|v| v == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Returns the previous view in the cycle (for Shift+Tab navigation).
    pub fn prev(&self) -> View {
        let idx = Self::ALL.iter().position(|v| v == self).unwrap_or(0);
        if idx == 0 {
            Self::ALL[Self::ALL.len() - 1]
        } else {
            Self::ALL[idx - 1]
        }
    }

    /// Try to parse a view from a hotkey character.
    pub fn from_hotkey(key: char) -> Option<View> {
        Self::ALL.iter().copied().find(|v| v.hotkey() == key)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}
