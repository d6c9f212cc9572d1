use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::errors::SelectionError;
use crate::loader::{self, DataLayout};
use crate::options::OptionTable;
use crate::presets::{self, CategoryPresets, Preset};
use crate::prompt;
use crate::selection::{self, Selection};
use crate::types::SeedState;

/// The handler for one category: its option table plus its presets.
#[derive(Debug, Clone)]
pub struct OutfitNode {
    table: OptionTable,
    presets: CategoryPresets,
}

impl OutfitNode {
    pub fn new(table: OptionTable, presets: CategoryPresets) -> Self {
        Self { table, presets }
    }

    pub fn category(&self) -> &str {
        self.table.category()
    }

    pub fn table(&self) -> &OptionTable {
        &self.table
    }

    pub fn presets(&self) -> &CategoryPresets {
        &self.presets
    }

    pub fn preset(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }

    /// `FemaleOutfitNode`.
    pub fn class_name(&self) -> String {
        format!("{}OutfitNode", capitalize(self.category()))
    }

    pub fn display_name(&self) -> String {
        match self.category() {
            "female" => "\u{1f457} Female Outfit Node".to_string(),
            "male" => "\u{1f454} Male Outfit Node".to_string(),
            other => format!("\u{1f455} {} Outfit Node", capitalize(other)),
        }
    }

    /// Menu path the host lists the node under.
    pub fn menu_category(&self) -> String {
        format!("\u{1f457} Outfit/{}", capitalize(self.category()))
    }

    /// Apply the `preset` field (if any) and parse the rest.
    ///
    /// Preset entries the selection cannot take are skipped, never raised.
    pub fn selection(&self, fields: &Value) -> Result<Selection, SelectionError> {
        let Some(map) = fields.as_object() else {
            return Err(SelectionError::NotAnObject);
        };
        let preset_name = match map.get(selection::PRESET) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() || s == crate::options::NONE => None,
            Some(Value::String(s)) => Some(s.as_str()),
            Some(_) => {
                return Err(SelectionError::InvalidType {
                    field: selection::PRESET.to_string(),
                    expected: crate::errors::Expected::String,
                })
            }
        };
        match preset_name {
            None => Selection::from_fields(fields, &self.table),
            Some(name) => {
                let preset = self
                    .preset(name)
                    .ok_or_else(|| SelectionError::UnknownPreset(name.to_string()))?;
                let usable = presets::usable_preset(&self.table, name, preset);
                let mut merged = map.clone();
                presets::apply_preset(&mut merged, &usable);
                Selection::from_fields(&Value::Object(merged), &self.table)
            }
        }
    }

    /// One host invocation: parse `fields`, build, and advance `seed_state`.
    ///
    /// A `_last_seed` field, when present, replaces `seed_state.last_seed`
    /// before the seed is resolved.
    pub fn invoke(
        &self,
        fields: &Value,
        seed_state: &mut SeedState,
    ) -> Result<(String, u32), SelectionError> {
        let sel = self.selection(fields)?;
        if let Some(last) = fields.get(selection::LAST_SEED) {
            seed_state.last_seed = selection::seed_field(selection::LAST_SEED, last)?;
        }
        let (prompt, used_seed) = prompt::build(&sel, *seed_state, &self.table);
        seed_state.record(sel.seed_mode, used_seed);
        info!(
            node = %self.class_name(),
            seed = used_seed,
            mode = %sel.seed_mode,
            "generated prompt"
        );
        Ok((prompt, used_seed))
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Every category's node, built once at startup and read-only afterward.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    nodes: Vec<OutfitNode>,
}

impl NodeRegistry {
    pub fn from_nodes(mut nodes: Vec<OutfitNode>) -> Self {
        nodes.sort_by(|a, b| a.category().cmp(b.category()));
        Self { nodes }
    }

    /// Load every category under `root`.
    pub fn discover(root: &Path) -> Self {
        let layout = DataLayout::new(root);
        let mut book = presets::load_presets(&layout);
        let nodes: Vec<OutfitNode> = loader::load_all(&layout)
            .into_iter()
            .map(|table| {
                let presets = book.remove(table.category()).unwrap_or_default();
                OutfitNode::new(table, presets)
            })
            .collect();
        debug!(root = %root.display(), nodes = nodes.len(), "registered outfit nodes");
        Self::from_nodes(nodes)
    }

    pub fn get(&self, category: &str) -> Option<&OutfitNode> {
        self.nodes.iter().find(|n| n.category() == category)
    }

    pub fn by_class_name(&self, class_name: &str) -> Option<&OutfitNode> {
        self.nodes.iter().find(|n| n.class_name() == class_name)
    }

    /// Look up by category first, then by class name.
    pub fn resolve(&self, name: &str) -> Option<&OutfitNode> {
        self.get(name).or_else(|| self.by_class_name(name))
    }

    pub fn categories(&self) -> Vec<&str> {
        self.nodes.iter().map(OutfitNode::category).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutfitNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
