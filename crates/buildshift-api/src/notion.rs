//! Notion proxy endpoints: task board, leaderboard, recipes.
//!
//! The proxy exposes two routes into Notion: the console integration, which
//! resolves named databases (task board, leaderboard), and the raw db/page
//! routes used by the recipe calculator, which carry the integration key as
//! a query param.

use std::collections::HashMap;

use serde_json::Value;

use buildshift_core::error::Result;
use buildshift_core::types::{LeaderboardEntry, NotionTask};
use buildshift_data::notion as parse;
use buildshift_data::recipe::{self, Recipe, RecipeOption};

use crate::client::ApiClient;

pub const CONSOLE_DATABASE: &str = "/notion-api/integrations/notion/consoleIntegration/database";

/// Path for a raw database query.
pub fn db_path(database_id: &str) -> String {
    format!("/api/notion/db/{database_id}")
}

/// Path for a page's flattened properties. Expects a dash-less page id.
pub fn page_properties_path(cleaned_id: &str) -> String {
    format!("/api/notion/page_properties/{cleaned_id}")
}

/// Path for server-side recipe computation.
pub fn recipe_compute_path(recipe_id: &str) -> String {
    format!("/api/notion/recipes/compute/{recipe_id}/")
}

impl ApiClient {
    /// Fetch a named console-integration database as raw JSON.
    pub async fn fetch_console_database(&self, name: &str) -> Result<Value> {
        self.get_json(CONSOLE_DATABASE, &[("name", name)]).await
    }

    /// Fetch and parse the task board.
    pub async fn fetch_notion_tasks(&self, database: &str) -> Result<Vec<NotionTask>> {
        let response = self.fetch_console_database(database).await?;
        Ok(parse::parse_tasks(&response))
    }

    /// Fetch and parse the leaderboard.
    pub async fn fetch_leaderboard(&self, database: &str) -> Result<Vec<LeaderboardEntry>> {
        let response = self.fetch_console_database(database).await?;
        Ok(parse::parse_leaderboard(&response))
    }

    /// Fetch the recipe selector options from the recipe database.
    pub async fn fetch_recipe_list(
        &self,
        database_id: &str,
        integration: &str,
    ) -> Result<Vec<RecipeOption>> {
        let response: Value = self
            .get_json(&db_path(database_id), &[("integration", integration)])
            .await?;
        Ok(recipe::recipe_options(&response))
    }

    /// Fetch one recipe's page properties and extract its fields.
    pub async fn fetch_recipe(&self, option: &RecipeOption, integration: &str) -> Result<Recipe> {
        let cleaned = option.id.replace('-', "");
        let page: Value = self
            .get_json(
                &page_properties_path(&cleaned),
                &[("integration", integration)],
            )
            .await?;
        Ok(Recipe::from_page(option.id.clone(), &page))
    }

    /// Submit recipe inputs for server-side computation.
    ///
    /// Returns the computed field map to display against the dependent
    /// fields.
    pub async fn compute_recipe(
        &self,
        recipe_id: &str,
        integration: &str,
        inputs: &HashMap<String, String>,
    ) -> Result<Value> {
        self.post_json(
            &recipe_compute_path(recipe_id),
            &[("integration", integration)],
            &serde_json::json!({ "inputs": inputs }),
        )
        .await
    }
}
