//! Wakeup-payload editing model.
//!
//! A machine's `wakeup_payload` is a nested JSON document sent to the device
//! on wakeup. The backend stores it either as an object or a pre-serialized
//! string; the editor normalizes both forms, tracks dirty state against the
//! last saved version, and exposes the document as flat pointer/value rows
//! for table rendering.

use serde_json::Value;

use buildshift_core::error::{BuildShiftError, Result};
use buildshift_core::types::Machine;

/// Editing state for one machine's wakeup payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadEditor {
    saved: Value,
    working: Value,
}

impl PayloadEditor {
    /// Load the editor from a machine record.
    ///
    /// String payloads are parsed; a machine without a payload starts from
    /// an empty document.
    pub fn load(machine: &Machine) -> Result<Self> {
        let payload = match &machine.wakeup_payload {
            None => Value::Object(Default::default()),
            Some(Value::String(raw)) => serde_json::from_str(raw).map_err(|e| {
                BuildShiftError::json_parse(format!("wakeup_payload for {}", machine.ip), e)
            })?,
            Some(value) => value.clone(),
        };

        Ok(Self {
            saved: payload.clone(),
            working: payload,
        })
    }

    /// The document being edited.
    pub fn working(&self) -> &Value {
        &self.working
    }

    /// The last saved version.
    pub fn saved(&self) -> &Value {
        &self.saved
    }

    /// Whether unsaved edits exist.
    pub fn is_dirty(&self) -> bool {
        self.working != self.saved
    }

    /// Set a leaf value by JSON pointer (e.g. `/pasteurizer/temperature_target`).
    pub fn set(&mut self, pointer: &str, value: Value) -> Result<()> {
        match self.working.pointer_mut(pointer) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(BuildShiftError::internal(format!(
                "no such payload field: {pointer}"
            ))),
        }
    }

    /// Mark the working document as persisted.
    pub fn mark_saved(&mut self) {
        self.saved = self.working.clone();
    }

    /// Discard unsaved edits.
    pub fn revert(&mut self) {
        self.working = self.saved.clone();
    }

    /// The working document as flat (pointer, rendered value) rows, leaves
    /// only, in document order.
    pub fn rows(&self) -> Vec<(String, String)> {
        let mut rows = Vec::new();
        flatten(&self.working, String::new(), &mut rows);
        rows
    }
}

fn flatten(value: &Value, pointer: String, rows: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                flatten(child, format!("{pointer}/{key}"), rows);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (i, child) in items.iter().enumerate() {
                flatten(child, format!("{pointer}/{i}"), rows);
            }
        }
        leaf => rows.push((pointer, render(leaf))),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn machine_with(payload: Value) -> Machine {
        let mut m = Machine::new("10.0.0.12", "px-101");
        m.wakeup_payload = Some(payload);
        m
    }

    #[test]
    fn test_load_object_payload() {
        let editor = PayloadEditor::load(&machine_with(json!({"interval_secs": 30}))).unwrap();
        assert_eq!(editor.working()["interval_secs"], 30);
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_load_string_payload() {
        let editor =
            PayloadEditor::load(&machine_with(json!("{\"interval_secs\": 30}"))).unwrap();
        assert_eq!(editor.working()["interval_secs"], 30);
    }

    #[test]
    fn test_load_invalid_string_payload_fails() {
        let err = PayloadEditor::load(&machine_with(json!("{not json"))).unwrap_err();
        assert!(matches!(err, BuildShiftError::JsonParse { .. }));
    }

    #[test]
    fn test_missing_payload_starts_empty() {
        let editor = PayloadEditor::load(&Machine::new("10.0.0.9", "bare")).unwrap();
        assert_eq!(editor.working(), &json!({}));
        assert!(editor.rows().is_empty());
    }

    #[test]
    fn test_edit_save_revert_cycle() {
        let mut editor = PayloadEditor::load(&machine_with(json!({
            "pasteurizer": { "temperature_target": 75, "status": "idle" }
        })))
        .unwrap();

        editor
            .set("/pasteurizer/temperature_target", json!(80))
            .unwrap();
        assert!(editor.is_dirty());

        editor.revert();
        assert!(!editor.is_dirty());
        assert_eq!(editor.working()["pasteurizer"]["temperature_target"], 75);

        editor.set("/pasteurizer/status", json!("running")).unwrap();
        editor.mark_saved();
        assert!(!editor.is_dirty());
        assert_eq!(editor.saved()["pasteurizer"]["status"], "running");
    }

    #[test]
    fn test_set_unknown_pointer_fails() {
        let mut editor = PayloadEditor::load(&machine_with(json!({"a": 1}))).unwrap();
        assert!(editor.set("/missing/field", json!(2)).is_err());
    }

    #[test]
    fn test_rows_flatten_nested_document() {
        let editor = PayloadEditor::load(&machine_with(json!({
            "pasteurizer": {
                "id": "PX-101",
                "alarms": [ { "active": false } ],
                "temperature_target": 75
            }
        })))
        .unwrap();

        let rows = editor.rows();
        assert!(rows.contains(&("/pasteurizer/id".to_string(), "PX-101".to_string())));
        assert!(rows.contains(&("/pasteurizer/alarms/0/active".to_string(), "false".to_string())));
        assert!(rows.contains(&("/pasteurizer/temperature_target".to_string(), "75".to_string())));
    }
}
