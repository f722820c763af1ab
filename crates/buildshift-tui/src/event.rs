//! Event handling for the BuildShift TUI.
//!
//! Provides keyboard input handling and event routing.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::view::View;

/// Application-level events that can trigger state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Switch to a specific view
    SwitchView(View),
    /// Cycle to the next view
    NextView,
    /// Cycle to the previous view
    PrevView,
    /// Show help overlay
    ShowHelp,
    /// Request application quit
    Quit,
    /// Force quit (Ctrl+C)
    ForceQuit,
    /// Refresh current view
    Refresh,
    /// Cancel current operation / close overlay
    Cancel,
    /// Navigate up in a list
    NavigateUp,
    /// Navigate down in a list
    NavigateDown,
    /// Navigate left (option selectors)
    NavigateLeft,
    /// Navigate right (option selectors)
    NavigateRight,
    /// Go to top
    GoToTop,
    /// Go to bottom
    GoToBottom,
    /// Select/open current item
    Select,
    /// Toggle expand/collapse of current item
    Toggle,
    /// Text input character (input mode)
    TextInput(char),
    /// Backspace in text input
    Backspace,
    /// Submit text input
    Submit,
    /// Move to the next form field (Tab in input mode)
    FieldNext,
    /// A view-specific action key
    Key(char),
    /// No action needed
    None,
}

/// Input handler for converting key events to app events.
///
/// Carries one bit of mode: whether a text field (form, filter, value edit)
/// currently owns the keyboard.
#[derive(Debug, Default)]
pub struct InputHandler {
    input_mode: bool,
}

impl InputHandler {
    /// Create a new input handler.
    pub fn new() -> Self {
        Self { input_mode: false }
    }

    /// Set whether text input mode is active.
    pub fn set_input_mode(&mut self, active: bool) {
        self.input_mode = active;
    }

    /// Returns whether text input mode is active.
    pub fn is_input_mode(&self) -> bool {
        self.input_mode
    }

    /// Handle a key event and return the corresponding app event.
    pub fn handle_key(&mut self, key: KeyEvent) -> AppEvent {
        // Ctrl+C always force quits
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return AppEvent::ForceQuit;
        }

        // Escape cancels the current operation and leaves input mode
        if key.code == KeyCode::Esc {
            self.input_mode = false;
            return AppEvent::Cancel;
        }

        if self.input_mode {
            return Self::handle_text_input(key);
        }

        self.handle_normal_mode(key)
    }

    /// Handle input while a text field owns the keyboard.
    fn handle_text_input(key: KeyEvent) -> AppEvent {
        match key.code {
            KeyCode::Enter => AppEvent::Submit,
            KeyCode::Backspace => AppEvent::Backspace,
            KeyCode::Tab => AppEvent::FieldNext,
            KeyCode::Char(c) => AppEvent::TextInput(c),
            _ => AppEvent::None,
        }
    }

    /// Handle input when in normal navigation mode.
    fn handle_normal_mode(&mut self, key: KeyEvent) -> AppEvent {
        // View hotkeys (digits)
        if let KeyCode::Char(c) = key.code {
            if let Some(view) = View::from_hotkey(c) {
                return AppEvent::SwitchView(view);
            }
        }

        match key.code {
            // Quit
            KeyCode::Char('q') | KeyCode::Char('Q') => AppEvent::Quit,

            // Help
            KeyCode::Char('?') => AppEvent::ShowHelp,

            // Tab cycling
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    AppEvent::PrevView
                } else {
                    AppEvent::NextView
                }
            }
            KeyCode::BackTab => AppEvent::PrevView,

            // List navigation
            KeyCode::Up | KeyCode::Char('k') => AppEvent::NavigateUp,
            KeyCode::Down | KeyCode::Char('j') => AppEvent::NavigateDown,
            KeyCode::Left => AppEvent::NavigateLeft,
            KeyCode::Right => AppEvent::NavigateRight,
            KeyCode::Home | KeyCode::Char('g') => AppEvent::GoToTop,
            KeyCode::End | KeyCode::Char('G') => AppEvent::GoToBottom,

            // Selection
            KeyCode::Enter => AppEvent::Select,
            KeyCode::Char(' ') => AppEvent::Toggle,

            // Refresh
            KeyCode::Char('r') | KeyCode::Char('R') => AppEvent::Refresh,

            // Everything else is a view-specific action key
            KeyCode::Char(c) => AppEvent::Key(c.to_ascii_lowercase()),

            _ => AppEvent::None,
        }
    }
}
