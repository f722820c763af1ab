//! Mapping Notion's nested property JSON into flat records.
//!
//! Notion responses wrap every value in a typed envelope (title arrays,
//! select vs multi-select, rich_text fragments, people arrays). Parsing is
//! tolerant at every level: a missing or malformed property yields the
//! field's fallback, and an invalid top-level response yields an empty list
//! plus a warning log.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use tracing::warn;

use buildshift_core::types::{LeaderboardEntry, NotionTask, Person, Timestamp};

use crate::rate::clamp_duration;

/// Parse tasks from a Notion database response.
///
/// Expected properties: `Title` (title), `Sprints` (relation),
/// `Assigned To` (people), `Status` (select or multi_select),
/// `Due Date` (date), `Short Description` (rich_text).
pub fn parse_tasks(response: &Value) -> Vec<NotionTask> {
    let Some(results) = results(response) else {
        warn!("invalid Notion task response: missing results array");
        return Vec::new();
    };

    results.iter().map(parse_task_page).collect()
}

fn parse_task_page(page: &Value) -> NotionTask {
    let props = &page["properties"];

    let title = title_text(&props["Title"]).unwrap_or_else(|| "Untitled".to_string());
    let sprint = props["Sprints"]["relation"][0]["id"]
        .as_str()
        .map(str::to_string);
    let status = status_text(&props["Status"]);
    let due_date = props["Due Date"]["date"]["start"]
        .as_str()
        .map(str::to_string);
    let assigned_to = people(&props["Assigned To"]);
    let short_description = joined_rich_text(&props["Short Description"]);

    // Combined body for the expanded view
    let mut parts = vec![format!("Status: {status}")];
    if let Some(sprint) = &sprint {
        parts.push(format!("Sprint: {sprint}"));
    }
    if !short_description.is_empty() {
        parts.push(short_description.clone());
    }
    let description = parts.join("\n");

    NotionTask {
        id: page["id"].as_str().map(str::to_string),
        title,
        sprint,
        status,
        due_date,
        assigned_to,
        short_description,
        description,
        completed: false,
        highlighted: false,
    }
}

/// Parse leaderboard entries from a Notion database response.
///
/// Expected properties: `User` (title), `Count` (number), `Duration`
/// (number, seconds), `Start Timestamp` / `End Timestamp` (date),
/// `Notes` (rich_text). Durations are clamped to the sanity bound and
/// epoch-1970 timestamps are treated as missing, falling back to the page's
/// created/last-edited times.
pub fn parse_leaderboard(response: &Value) -> Vec<LeaderboardEntry> {
    let Some(results) = results(response) else {
        warn!("invalid Notion leaderboard response: missing results array");
        return Vec::new();
    };

    results.iter().map(parse_leaderboard_page).collect()
}

fn parse_leaderboard_page(page: &Value) -> LeaderboardEntry {
    let props = &page["properties"];

    let user = title_text(&props["User"]).unwrap_or_else(|| "Unknown".to_string());
    let count = props["Count"]["number"].as_f64().unwrap_or(0.0);
    let duration_secs = clamp_duration(props["Duration"]["number"].as_f64().unwrap_or(0.0));

    let start = date_start(&props["Start Timestamp"])
        .or_else(|| parse_timestamp(page["created_time"].as_str()));
    let end = date_start(&props["End Timestamp"])
        .or_else(|| parse_timestamp(page["last_edited_time"].as_str()));

    LeaderboardEntry {
        id: page["id"].as_str().map(str::to_string),
        user,
        count,
        duration_secs,
        start,
        end,
        notes: joined_rich_text(&props["Notes"]),
    }
}

/// The results array of a database response, if the shape is valid.
fn results(response: &Value) -> Option<&Vec<Value>> {
    response.get("results")?.as_array()
}

/// First plain_text of a title property, trimmed. None when blank.
fn title_text(prop: &Value) -> Option<String> {
    let text = prop["title"][0]["plain_text"].as_str()?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Select name, or multi-select names joined with ", ". "No Status" fallback.
fn status_text(prop: &Value) -> String {
    if let Some(name) = prop["select"]["name"].as_str() {
        return name.to_string();
    }
    if let Some(options) = prop["multi_select"].as_array() {
        let names: Vec<&str> = options
            .iter()
            .filter_map(|o| o["name"].as_str())
            .collect();
        if !names.is_empty() {
            return names.join(", ");
        }
    }
    "No Status".to_string()
}

/// People property as flat persons, with a name fallback per person.
fn people(prop: &Value) -> Vec<Person> {
    let Some(people) = prop["people"].as_array() else {
        return Vec::new();
    };
    people
        .iter()
        .map(|p| Person {
            id: p["id"].as_str().map(str::to_string),
            name: p["name"].as_str().unwrap_or("Unknown").to_string(),
            avatar: p["avatar_url"].as_str().map(str::to_string),
        })
        .collect()
}

/// Rich text fragments joined with spaces, trimmed.
fn joined_rich_text(prop: &Value) -> String {
    let Some(fragments) = prop["rich_text"].as_array() else {
        return String::new();
    };
    fragments
        .iter()
        .filter_map(|t| t["plain_text"].as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// A date property's start value as a timestamp.
///
/// Epoch-1970 values are placeholder writes from the counter firmware and
/// are treated as missing.
fn date_start(prop: &Value) -> Option<Timestamp> {
    let raw = prop["date"]["start"].as_str()?;
    if raw.starts_with("1970") {
        return None;
    }
    parse_timestamp(Some(raw))
}

/// Parse an RFC 3339 timestamp or a date-only value (midnight UTC).
fn parse_timestamp(raw: Option<&str>) -> Option<Timestamp> {
    let raw = raw?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn task_page() -> Value {
        json!({
            "id": "page-1",
            "properties": {
                "Title": { "title": [{ "plain_text": "  Finish quarterly report " }] },
                "Sprints": { "relation": [{ "id": "sprint-9" }] },
                "Status": { "select": { "name": "In Progress" } },
                "Due Date": { "date": { "start": "2026-09-01" } },
                "Assigned To": { "people": [
                    { "id": "u1", "name": "Alice Johnson", "avatar_url": "https://img/a.png" },
                    { "id": "u2" }
                ]},
                "Short Description": { "rich_text": [
                    { "plain_text": "Compile sales data" },
                    { "plain_text": "and finalize." }
                ]}
            }
        })
    }

    #[test]
    fn test_parse_task_fields() {
        let response = json!({ "results": [task_page()] });
        let tasks = parse_tasks(&response);
        assert_eq!(tasks.len(), 1);

        let task = &tasks[0];
        assert_eq!(task.id.as_deref(), Some("page-1"));
        assert_eq!(task.title, "Finish quarterly report");
        assert_eq!(task.sprint.as_deref(), Some("sprint-9"));
        assert_eq!(task.status, "In Progress");
        assert_eq!(task.due_date.as_deref(), Some("2026-09-01"));
        assert_eq!(task.assigned_to.len(), 2);
        assert_eq!(task.assigned_to[0].name, "Alice Johnson");
        assert_eq!(task.assigned_to[1].name, "Unknown");
        assert_eq!(task.short_description, "Compile sales data and finalize.");
        assert!(task.description.contains("Status: In Progress"));
        assert!(task.description.contains("Sprint: sprint-9"));
        assert!(!task.completed);
    }

    #[test]
    fn test_parse_task_fallbacks() {
        let response = json!({ "results": [{ "id": "bare", "properties": {} }] });
        let tasks = parse_tasks(&response);
        let task = &tasks[0];
        assert_eq!(task.title, "Untitled");
        assert_eq!(task.status, "No Status");
        assert!(task.sprint.is_none());
        assert!(task.assigned_to.is_empty());
        assert_eq!(task.description, "Status: No Status");
    }

    #[test]
    fn test_multi_select_status_joined() {
        let response = json!({ "results": [{
            "properties": {
                "Status": { "multi_select": [{ "name": "Urgent" }, { "name": "Review" }] }
            }
        }]});
        assert_eq!(parse_tasks(&response)[0].status, "Urgent, Review");
    }

    #[test]
    fn test_invalid_response_yields_empty() {
        assert!(parse_tasks(&json!({ "object": "error" })).is_empty());
        assert!(parse_tasks(&json!(null)).is_empty());
        assert!(parse_leaderboard(&json!({ "results": "nope" })).is_empty());
    }

    #[test]
    fn test_parse_leaderboard_entry() {
        let response = json!({ "results": [{
            "id": "lb-1",
            "created_time": "2026-08-01T09:00:00.000Z",
            "last_edited_time": "2026-08-01T10:30:00.000Z",
            "properties": {
                "User": { "title": [{ "plain_text": "alice" }] },
                "Count": { "number": 120 },
                "Duration": { "number": 90 },
                "Start Timestamp": { "date": { "start": "2026-08-01T09:05:00.000Z" } },
                "End Timestamp": { "date": { "start": "1970-01-01T00:00:00.000Z" } },
                "Notes": { "rich_text": [{ "plain_text": "morning shift" }] }
            }
        }]});

        let entries = parse_leaderboard(&response);
        let e = &entries[0];
        assert_eq!(e.user, "alice");
        assert_eq!(e.count, 120.0);
        assert_eq!(e.duration_secs, 90.0);
        // Explicit start wins
        assert_eq!(e.start.unwrap().to_rfc3339(), "2026-08-01T09:05:00+00:00");
        // Epoch end is discarded in favor of last_edited_time
        assert_eq!(e.end.unwrap().to_rfc3339(), "2026-08-01T10:30:00+00:00");
        assert_eq!(e.notes, "morning shift");
    }

    #[test]
    fn test_leaderboard_duration_clamped() {
        let response = json!({ "results": [{
            "properties": {
                "User": { "title": [{ "plain_text": "bob" }] },
                "Count": { "number": 5 },
                "Duration": { "number": 86400.0 * 400.0 }
            }
        }]});
        let entries = parse_leaderboard(&response);
        assert_eq!(entries[0].duration_secs, 0.0);
    }

    #[test]
    fn test_leaderboard_fallbacks() {
        let response = json!({ "results": [{ "properties": {} }] });
        let e = &parse_leaderboard(&response)[0];
        assert_eq!(e.user, "Unknown");
        assert_eq!(e.count, 0.0);
        assert!(e.start.is_none());
        assert!(e.end.is_none());
    }

    #[test]
    fn test_date_only_timestamp_parses() {
        let ts = parse_timestamp(Some("2026-03-05")).unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-03-05T00:00:00+00:00");
        assert!(parse_timestamp(Some("not a date")).is_none());
    }
}
