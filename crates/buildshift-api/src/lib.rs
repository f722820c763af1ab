//! # buildshift-api
//!
//! HTTP client for the BuildShift backend and Notion proxy.
//!
//! [`ApiClient`] wraps a single reqwest client configured from
//! [`buildshift_core::Config`] and is passed explicitly to everything that
//! needs the network (no global singleton). Endpoint groups live in their
//! own modules:
//! - [`machines`] - machine/task CRUD against the arduino consumer API
//! - [`notion`] - Notion proxy: task board, leaderboard, recipes
//! - [`analytics`] - counter-session analytics data
//!
//! Per the dashboard's error policy there are no retries and no backoff:
//! every failure maps to a [`buildshift_core::BuildShiftError`] and the
//! caller decides between placeholder data and a refresh hint.

pub mod analytics;
pub mod client;
pub mod machines;
pub mod notion;

pub use analytics::SessionQuery;
pub use client::ApiClient;
