//! Named partial selections per category.
//!
//! `<root>/presets.json`:
//!
//! ```json
//! { "female": { "Glam Party": { "torso": "sequin dress", "pose": "random" } } }
//! ```

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::loader::DataLayout;
use crate::options::{self, is_sentinel, OptionTable, NONE, RANDOM};
use crate::selection;

pub const PRESETS_FILE: &str = "presets.json";

/// Field name -> value to fill in.
pub type Preset = BTreeMap<String, String>;

/// Preset name -> preset, for one category.
pub type CategoryPresets = BTreeMap<String, Preset>;

/// Category -> its presets.
pub type PresetBook = BTreeMap<String, CategoryPresets>;

/// Load `presets.json`; missing means no presets, malformed is logged.
pub fn load_presets(layout: &DataLayout) -> PresetBook {
    let path = layout.presets_path();
    if !path.exists() {
        return PresetBook::new();
    }
    let parsed = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|content| {
            serde_json::from_str::<PresetBook>(&content).map_err(|e| e.to_string())
        });
    match parsed {
        Ok(book) => book,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot load presets");
            PresetBook::new()
        }
    }
}

/// True when a field has no user choice a preset should respect.
pub fn is_unset(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty() || s == NONE || s == RANDOM,
        Some(_) => false,
    }
}

/// Fill unset fields of `current` from `preset`. Concrete choices win.
pub fn apply_preset(current: &mut Map<String, Value>, preset: &Preset) {
    for (key, value) in preset {
        if is_unset(current.get(key)) {
            current.insert(key.clone(), Value::String(value.clone()));
        }
    }
}

/// The part of `preset` a selection can take: option fields whose value is
/// in the table, plus the free-text fields. Everything else is logged and
/// left out, so a stale or free-form preset never fails a build.
pub fn usable_preset(table: &OptionTable, name: &str, preset: &Preset) -> Preset {
    preset
        .iter()
        .filter(|(field, value)| {
            let field = field.as_str();
            if matches!(
                field,
                selection::CHARACTER_NAME | selection::CUSTOM_ATTRIBUTES | selection::MAKEUP_DATA
            ) {
                return true;
            }
            if !options::FIXED_FIELDS.contains(&field) && table.body_part(field).is_none() {
                warn!(preset = name, field, "preset field is not selectable; skipped");
                return false;
            }
            let known = table
                .options(field)
                .is_some_and(|opts| opts.iter().any(|o| o == *value));
            if !known {
                warn!(preset = name, field, value = %value, "preset value is not an option; skipped");
            }
            known
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// A preset value that no longer matches the category's options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresetIssue {
    pub category: String,
    pub preset: String,
    pub field: String,
    pub value: String,
}

/// Check body-part, pose and background values against the table.
/// Other keys are free-form and not checked.
pub fn check_presets(table: &OptionTable, presets: &CategoryPresets) -> Vec<PresetIssue> {
    let mut issues = Vec::new();
    for (name, preset) in presets {
        for (field, value) in preset {
            let checked = field == options::POSE
                || field == options::BACKGROUND
                || table.body_part(field).is_some();
            if !checked || is_sentinel(value) {
                continue;
            }
            let known = table
                .options(field)
                .is_some_and(|opts| opts.iter().any(|o| o == value));
            if !known {
                issues.push(PresetIssue {
                    category: table.category().to_string(),
                    preset: name.clone(),
                    field: field.clone(),
                    value: value.clone(),
                });
            }
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn glam() -> Preset {
        [
            ("torso", "sequin dress"),
            ("legs", "sheer tights"),
            ("feet", "stilettos"),
            ("background", "Ballroom"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn fills_only_unset_fields() {
        let mut current = json!({
            "preset": "Glam Party",
            "torso": "random",
            "legs": "",
            "feet": "none",
            "background": "Urban rooftop"
        })
        .as_object()
        .cloned()
        .unwrap();

        apply_preset(&mut current, &glam());
        assert_eq!(current["torso"], "sequin dress");
        assert_eq!(current["legs"], "sheer tights");
        assert_eq!(current["feet"], "stilettos");
        assert_eq!(current["background"], "Urban rooftop");
    }

    #[test]
    fn fills_missing_fields() {
        let mut current = Map::new();
        apply_preset(&mut current, &glam());
        assert_eq!(current.len(), 4);
    }

    #[test]
    fn check_flags_unknown_values() {
        let table = OptionTable::new("female")
            .with_options("torso", ["sequin dress"])
            .with_options("legs", ["jeans"])
            .with_options("background", ["Ballroom"]);
        let presets: CategoryPresets = [("Glam Party".to_string(), glam())].into();
        let issues = check_presets(&table, &presets);
        // "feet" is not a body part of this table, so it is free-form.
        assert_eq!(
            issues,
            vec![PresetIssue {
                category: "female".into(),
                preset: "Glam Party".into(),
                field: "legs".into(),
                value: "sheer tights".into(),
            }]
        );
    }

    #[test]
    fn load_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        assert!(load_presets(&layout).is_empty());

        std::fs::write(dir.path().join(PRESETS_FILE), "{\"female\": [").unwrap();
        assert!(load_presets(&layout).is_empty());

        std::fs::write(
            dir.path().join(PRESETS_FILE),
            r#"{"female": {"Casual": {"torso": "t-shirt"}}}"#,
        )
        .unwrap();
        let book = load_presets(&layout);
        assert_eq!(book["female"]["Casual"]["torso"], "t-shirt");
    }

    #[test]
    fn usable_preset_drops_free_form_and_stale_values() {
        let table = OptionTable::new("female")
            .with_options("torso", ["sequin dress"])
            .with_options("feet", ["stilettos"]);
        let preset: Preset = [
            ("torso", "sequin dress"),
            ("feet", "glass slippers"),
            ("background", "random"),
            ("mood", "dramatic"),
            ("character_name", "Mira"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let usable = usable_preset(&table, "Glam", &preset);
        let keys: Vec<_> = usable.keys().map(String::as_str).collect();
        assert_eq!(keys, ["background", "character_name", "torso"]);
    }
}
