use serde_json::Value;
use tracing::warn;

use crate::types::{LegacyMakeupWidget, MakeupEntry};

/// Parse the host's JSON-encoded makeup list.
///
/// Empty input means no entries. Malformed JSON is logged and also means no
/// entries, which lets the legacy widget path take over.
pub fn parse_makeup_data(raw: &str) -> Vec<MakeupEntry> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => entries_from_value(&value),
        Err(e) => {
            warn!(error = %e, "cannot parse makeup data");
            Vec::new()
        }
    }
}

/// Entries from an already-decoded list; items that do not fit are skipped.
pub fn entries_from_value(value: &Value) -> Vec<MakeupEntry> {
    let Some(items) = value.as_array() else {
        warn!("makeup data is not a list");
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| {
            if !item.is_object() {
                warn!(index = i, "makeup item is not an object; skipped");
                return None;
            }
            match serde_json::from_value::<MakeupEntry>(item.clone()) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(index = i, error = %e, "makeup item skipped");
                    None
                }
            }
        })
        .collect()
}

/// The `Makeup: ...` segment, or `None` when nothing renders.
///
/// Structured entries win; legacy widgets are consulted only when the
/// structured list renders nothing.
pub fn render_segment(entries: &[MakeupEntry], legacy: &[LegacyMakeupWidget]) -> Option<String> {
    let mut parts: Vec<String> = entries.iter().filter_map(MakeupEntry::render).collect();
    if parts.is_empty() {
        parts = legacy.iter().filter_map(LegacyMakeupWidget::render).collect();
    }
    if parts.is_empty() {
        None
    } else {
        Some(format!("Makeup: {}", parts.join(", ")))
    }
}
