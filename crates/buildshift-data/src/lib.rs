//! # buildshift-data
//!
//! Data transformation layer for the BuildShift dashboard.
//!
//! Everything in this crate is pure computation over in-memory data:
//! - [`window`] - paging window behind the infinite-scroll lists
//! - [`filter`] - task board filtering and sorting
//! - [`rate`] - leaderboard rate computation and rank tiers
//! - [`chart`] - dataset-global duration scaling for analytics charts
//! - [`notion`] - Notion property JSON to flat record mapping
//! - [`lifecycle`] - task state machine and update payloads
//! - [`recipe`] - recipe field extraction and input partitioning
//! - [`payload`] - wakeup-payload editing model

pub mod chart;
pub mod filter;
pub mod lifecycle;
pub mod notion;
pub mod payload;
pub mod rate;
pub mod recipe;
pub mod window;

pub use chart::{ChartPoint, DurationScale};
pub use filter::{SortMode, TaskFilter};
pub use lifecycle::{TaskAction, TaskUpdate};
pub use payload::PayloadEditor;
pub use rate::{LeaderboardSort, RankTier, RankedEntry, Rate, RateUnit};
pub use recipe::{FieldKind, Recipe, RecipeField, RecipeOption};
pub use window::PageWindow;
