use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::errors::{Expected, SelectionError};
use crate::makeup;
use crate::options::{self, OptionTable, NONE};
use crate::types::{default_intensity, LegacyMakeupWidget, MakeupEntry, SeedMode};

pub const CHARACTER_NAME: &str = "character_name";
pub const CUSTOM_ATTRIBUTES: &str = "custom_attributes";
pub const SEED: &str = "seed";
pub const SEED_MODE: &str = "seed_mode";
pub const MAKEUP_DATA: &str = "makeup_data";
/// Hidden carry-over read by the node, not by the selection.
pub const LAST_SEED: &str = "_last_seed";
/// Preset name, applied by the node before parsing.
pub const PRESET: &str = "preset";

const LEGACY_PREFIX: &str = "makeup_";

/// Everything one invocation asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub character_name: String,
    pub age_group: String,
    pub race: String,
    pub body_type: String,
    /// Body part name -> choice. Parts not present are `"none"`.
    pub attire: BTreeMap<String, String>,
    pub pose: String,
    pub background: String,
    pub custom_attributes: String,
    pub seed: u32,
    pub seed_mode: SeedMode,
    pub makeup: Vec<MakeupEntry>,
    pub legacy_makeup: Vec<LegacyMakeupWidget>,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            character_name: String::new(),
            age_group: NONE.to_string(),
            race: NONE.to_string(),
            body_type: NONE.to_string(),
            attire: BTreeMap::new(),
            pose: NONE.to_string(),
            background: NONE.to_string(),
            custom_attributes: String::new(),
            seed: 0,
            seed_mode: SeedMode::default(),
            makeup: Vec::new(),
            legacy_makeup: Vec::new(),
        }
    }
}

impl Selection {
    /// A selection with every field `"none"` and a fixed seed.
    #[cfg(test)]
    pub(crate) fn fixed(seed: u32) -> Self {
        Self {
            seed,
            seed_mode: SeedMode::Fixed,
            ..Self::default()
        }
    }

    pub fn attire_choice(&self, part: &str) -> &str {
        self.attire.get(part).map_or(NONE, String::as_str)
    }

    /// Choice for a fixed single-choice field or a body part.
    pub fn choice(&self, field: &str) -> &str {
        match field {
            options::AGE_GROUP => &self.age_group,
            options::RACE => &self.race,
            options::BODY_TYPE => &self.body_type,
            options::POSE => &self.pose,
            options::BACKGROUND => &self.background,
            part => self.attire_choice(part),
        }
    }

    /// Parse a host-style flat field map against a category's options.
    ///
    /// Missing choice fields are `"none"`, a missing seed is 0 and a missing
    /// seed mode is `random`. Unknown keys and values outside a field's
    /// option list are rejected.
    pub fn from_fields(fields: &Value, table: &OptionTable) -> Result<Self, SelectionError> {
        let map = fields.as_object().ok_or(SelectionError::NotAnObject)?;
        let mut sel = Selection::default();
        let mut legacy: BTreeMap<u32, LegacySlot> = BTreeMap::new();

        for (key, value) in map {
            match key.as_str() {
                CHARACTER_NAME => sel.character_name = string_field(key, value)?.to_string(),
                CUSTOM_ATTRIBUTES => sel.custom_attributes = string_field(key, value)?.to_string(),
                SEED => sel.seed = seed_field(key, value)?,
                SEED_MODE => sel.seed_mode = SeedMode::parse(string_field(key, value)?),
                MAKEUP_DATA => sel.makeup = makeup_field(key, value)?,
                LAST_SEED | PRESET => {}
                field if options::FIXED_FIELDS.contains(&field) => {
                    let choice = choice_field(table, key, value)?;
                    match field {
                        options::AGE_GROUP => sel.age_group = choice,
                        options::RACE => sel.race = choice,
                        options::BODY_TYPE => sel.body_type = choice,
                        options::POSE => sel.pose = choice,
                        _ => sel.background = choice,
                    }
                }
                part if table.body_part(part).is_some() => {
                    let choice = choice_field(table, key, value)?;
                    sel.attire.insert(part.to_string(), choice);
                }
                other => {
                    let (index, slot) = parse_legacy_key(other)
                        .ok_or_else(|| SelectionError::UnknownField(other.to_string()))?;
                    let entry = legacy.entry(index).or_default();
                    match slot {
                        LegacyKey::Type => entry.kind = Some(string_field(key, value)?.to_string()),
                        LegacyKey::Intensity => {
                            entry.intensity = Some(string_field(key, value)?.to_string())
                        }
                        LegacyKey::Enabled => entry.enabled = Some(bool_field(key, value)?),
                    }
                }
            }
        }

        sel.legacy_makeup = legacy
            .into_iter()
            .filter_map(|(index, slot)| {
                Some(LegacyMakeupWidget {
                    index,
                    kind: slot.kind?,
                    intensity: slot.intensity.unwrap_or_else(default_intensity),
                    enabled: slot.enabled.unwrap_or(true),
                })
            })
            .collect();
        Ok(sel)
    }
}

/// Keys the boundary claims before body parts are consulted.
///
/// A body-part file with one of these names could never be selected.
pub(crate) fn is_reserved_key(key: &str) -> bool {
    matches!(
        key,
        CHARACTER_NAME | CUSTOM_ATTRIBUTES | SEED | SEED_MODE | MAKEUP_DATA | LAST_SEED | PRESET
    ) || options::FIXED_FIELDS.contains(&key)
        || parse_legacy_key(key).is_some()
}

// ── Field helpers ───────────────────────────────────────────────

#[derive(Default)]
struct LegacySlot {
    kind: Option<String>,
    intensity: Option<String>,
    enabled: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LegacyKey {
    Type,
    Intensity,
    Enabled,
}

/// `makeup_3_type` -> `(3, Type)`.
fn parse_legacy_key(key: &str) -> Option<(u32, LegacyKey)> {
    let rest = key.strip_prefix(LEGACY_PREFIX)?;
    let (index, suffix) = rest.split_once('_')?;
    let slot = match suffix {
        "type" => LegacyKey::Type,
        "intensity" => LegacyKey::Intensity,
        "enabled" => LegacyKey::Enabled,
        _ => return None,
    };
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    index.parse().ok().map(|i| (i, slot))
}

fn string_field<'a>(key: &str, value: &'a Value) -> Result<&'a str, SelectionError> {
    value.as_str().ok_or_else(|| SelectionError::InvalidType {
        field: key.to_string(),
        expected: Expected::String,
    })
}

fn bool_field(key: &str, value: &Value) -> Result<bool, SelectionError> {
    value.as_bool().ok_or_else(|| SelectionError::InvalidType {
        field: key.to_string(),
        expected: Expected::Bool,
    })
}

/// Unsigned 32-bit seed; accepts JSON integers only.
pub(crate) fn seed_field(key: &str, value: &Value) -> Result<u32, SelectionError> {
    let Value::Number(n) = value else {
        return Err(SelectionError::InvalidType {
            field: key.to_string(),
            expected: Expected::Integer,
        });
    };
    let out_of_range = || SelectionError::SeedOutOfRange {
        field: key.to_string(),
        value: n.to_string(),
    };
    match n.as_u64() {
        Some(v) => u32::try_from(v).map_err(|_| out_of_range()),
        None if n.is_i64() => Err(out_of_range()),
        None => Err(SelectionError::InvalidType {
            field: key.to_string(),
            expected: Expected::Integer,
        }),
    }
}

fn choice_field(table: &OptionTable, key: &str, value: &Value) -> Result<String, SelectionError> {
    let choice = string_field(key, value)?;
    let allowed = table.options(key).unwrap_or_default();
    if allowed.iter().any(|o| o == choice) {
        Ok(choice.to_string())
    } else {
        Err(SelectionError::UnknownOption {
            field: key.to_string(),
            value: choice.to_string(),
        })
    }
}

fn makeup_field(key: &str, value: &Value) -> Result<Vec<MakeupEntry>, SelectionError> {
    match value {
        Value::String(raw) => Ok(makeup::parse_makeup_data(raw)),
        Value::Array(_) => Ok(makeup::entries_from_value(value)),
        Value::Null => Ok(Vec::new()),
        _ => Err(SelectionError::InvalidType {
            field: key.to_string(),
            expected: Expected::MakeupList,
        }),
    }
}
