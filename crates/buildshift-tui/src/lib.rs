//! Terminal UI for the BuildShift admin dashboard.
//!
//! This crate provides the Ratatui-based terminal interface for BuildShift.
//!
//! ## Features
//!
//! - Multi-view dashboard with hotkey navigation
//! - Machine list with task lifecycle controls
//! - Notion task board with filter, sort, and search
//! - Counter leaderboard with derived rates and per-user drill-down
//! - Session analytics charts
//! - Recipe calculators and wakeup-payload editing
//!
//! ## Hotkeys
//!
//! - `1` - Overview (dashboard)
//! - `2` - Machines view
//! - `3` - Tasks view
//! - `4` - Leaderboard view
//! - `5` - Analytics view
//! - `6` - Recipes view
//! - `7` - Payload editor
//! - `?` - Help
//! - `q` - Quit
//! - `Tab` - Cycle views
//! - `Esc` - Cancel/back

pub mod analytics_panel;
pub mod app;
pub mod data;
pub mod editor_panel;
pub mod event;
pub mod leaderboard_panel;
pub mod machines_panel;
pub mod overview_panel;
pub mod recipes_panel;
pub mod tasks_panel;
pub mod theme;
pub mod view;

pub use app::{App, AppResult};
pub use data::{DashboardData, FetchOutcome};
pub use view::View;
