//! Recipe field extraction and input partitioning.
//!
//! Recipe pages come back from the Notion proxy as flat property maps mixing
//! plain numbers, ISO date strings, and Notion formula envelopes. The
//! calculator extracts the numeric and date fields, then splits them into
//! user-controlled inputs (from the configured controlling-inputs map) and
//! read-only dependent fields computed server-side.

use serde_json::Value;

/// What kind of input widget a recipe field needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Number,
    Date,
}

/// A single extractable field on a recipe page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeField {
    /// Property key, also used as the display label
    pub key: String,
    pub kind: FieldKind,
}

/// A recipe with its extractable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub fields: Vec<RecipeField>,
}

impl Recipe {
    /// Build a recipe from a page-properties response.
    ///
    /// The page name comes from the `Name` property; fields are every
    /// property that carries a number or date in any of the shapes the
    /// proxy emits.
    pub fn from_page(id: impl Into<String>, page: &Value) -> Self {
        let name = page["Name"]
            .as_str()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("Unnamed")
            .to_string();

        Self {
            id: id.into(),
            name,
            fields: extract_fields(page),
        }
    }

    /// The page id with dashes removed, as the page-properties endpoint
    /// expects it.
    pub fn cleaned_id(&self) -> String {
        self.id.replace('-', "")
    }

    /// Split fields into (editable, dependent) under the controlling-inputs
    /// list for this recipe. Fields not listed are dependent and render
    /// read-only.
    pub fn partition<'a>(
        &'a self,
        controlling: &[String],
    ) -> (Vec<&'a RecipeField>, Vec<&'a RecipeField>) {
        self.fields
            .iter()
            .partition(|f| controlling.iter().any(|c| c == &f.key))
    }
}

/// Extract numeric and date fields from a page-properties map.
pub fn extract_fields(page: &Value) -> Vec<RecipeField> {
    let Some(map) = page.as_object() else {
        return Vec::new();
    };

    map.iter()
        .filter_map(|(key, value)| {
            field_kind(value).map(|kind| RecipeField {
                key: key.clone(),
                kind,
            })
        })
        .collect()
}

/// Classify one property value, or None for non-field properties.
fn field_kind(value: &Value) -> Option<FieldKind> {
    match value {
        Value::Number(_) => Some(FieldKind::Number),
        Value::String(s) if is_iso_date(s) => Some(FieldKind::Date),
        Value::Object(_) => {
            if value["type"] == "number" {
                return Some(FieldKind::Number);
            }
            if value["type"] == "formula" {
                return match value["formula"]["type"].as_str() {
                    Some("number") => Some(FieldKind::Number),
                    Some("date") => Some(FieldKind::Date),
                    _ => None,
                };
            }
            None
        }
        _ => None,
    }
}

/// Simple `YYYY-MM-DD` shape check.
fn is_iso_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| matches!(i, 4 | 7) || b.is_ascii_digit())
}

/// An entry in the recipe selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeOption {
    pub id: String,
    pub name: String,
}

/// Extract selector options from the recipe-list database response.
pub fn recipe_options(response: &Value) -> Vec<RecipeOption> {
    let Some(results) = response["results"].as_array() else {
        return Vec::new();
    };

    results
        .iter()
        .filter_map(|page| {
            let id = page["id"].as_str()?.to_string();
            let name = page["properties"]["Name"]["title"][0]["plain_text"]
                .as_str()
                .unwrap_or("Unnamed")
                .to_string();
            Some(RecipeOption { id, name })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page() -> Value {
        json!({
            "Name": "Vanilla Base",
            "Milk (L)": 12.5,
            "Sugar (kg)": { "type": "number", "number": 3.0 },
            "Batch Date": "2026-08-20",
            "Yield (L)": { "type": "formula", "formula": { "type": "number", "number": 15.1 } },
            "Best Before": { "type": "formula", "formula": { "type": "date", "date": { "start": "2026-09-20" } } },
            "Notes": "stir slowly",
            "Archived": false
        })
    }

    #[test]
    fn test_extract_field_shapes() {
        let recipe = Recipe::from_page("abc-123", &page());
        assert_eq!(recipe.name, "Vanilla Base");

        let kind_of = |key: &str| {
            recipe
                .fields
                .iter()
                .find(|f| f.key == key)
                .map(|f| f.kind)
        };
        assert_eq!(kind_of("Milk (L)"), Some(FieldKind::Number));
        assert_eq!(kind_of("Sugar (kg)"), Some(FieldKind::Number));
        assert_eq!(kind_of("Batch Date"), Some(FieldKind::Date));
        assert_eq!(kind_of("Yield (L)"), Some(FieldKind::Number));
        assert_eq!(kind_of("Best Before"), Some(FieldKind::Date));
        // Strings and booleans are not fields
        assert_eq!(kind_of("Notes"), None);
        assert_eq!(kind_of("Archived"), None);
        assert_eq!(kind_of("Name"), None);
    }

    #[test]
    fn test_partition_editable_vs_dependent() {
        let recipe = Recipe::from_page("abc-123", &page());
        let controlling = vec!["Milk (L)".to_string(), "Sugar (kg)".to_string()];
        let (editable, dependent) = recipe.partition(&controlling);

        let keys = |fields: &[&RecipeField]| {
            fields.iter().map(|f| f.key.clone()).collect::<Vec<_>>()
        };
        assert_eq!(keys(&editable).len(), 2);
        assert!(keys(&editable).contains(&"Milk (L)".to_string()));
        // Everything not listed is dependent
        assert_eq!(dependent.len(), recipe.fields.len() - 2);
        assert!(keys(&dependent).contains(&"Yield (L)".to_string()));
    }

    #[test]
    fn test_no_controlling_inputs_means_all_dependent() {
        let recipe = Recipe::from_page("abc-123", &page());
        let (editable, dependent) = recipe.partition(&[]);
        assert!(editable.is_empty());
        assert_eq!(dependent.len(), recipe.fields.len());
    }

    #[test]
    fn test_cleaned_id_strips_dashes() {
        let recipe = Recipe::from_page("2a9c-ee7d-24dc", &json!({}));
        assert_eq!(recipe.cleaned_id(), "2a9cee7d24dc");
        assert_eq!(recipe.name, "Unnamed");
    }

    #[test]
    fn test_is_iso_date() {
        assert!(is_iso_date("2026-08-20"));
        assert!(!is_iso_date("2026-8-20"));
        assert!(!is_iso_date("2026-08-20T10:00:00Z"));
        assert!(!is_iso_date("stir slowly"));
    }

    #[test]
    fn test_recipe_options() {
        let response = json!({ "results": [
            { "id": "r1", "properties": { "Name": { "title": [{ "plain_text": "Vanilla Base" }] } } },
            { "id": "r2", "properties": {} },
            { "properties": { "Name": { "title": [{ "plain_text": "No Id" }] } } }
        ]});
        let options = recipe_options(&response);
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].name, "Vanilla Base");
        assert_eq!(options[1].name, "Unnamed");
    }
}
