//! Option tables from the on-disk data tree.
//!
//! ```text
//! <root>/backgrounds.json        {"backgrounds": [..]}
//! <root>/race.json               {"races": [..]}
//! <root>/age_groups.json         {"age_groups": [..]}
//! <root>/outfit/<category>/
//!     body_type.json             {"attire": [{"type": ..}, ..]}
//!     poses.json                 {"poses": [..]}
//!     makeup.json                {"attire": [{"type": ..}, ..]}
//!     <body part>.json           {"attire": [{"type": ..}, ..]}
//! ```
//!
//! Nothing here fails: a missing file yields the field's sentinel-only list
//! and an unreadable or malformed one is logged first.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::LoadError;
use crate::options::{self, OptionTable};
use crate::selection;

pub const OUTFIT_DIR: &str = "outfit";
pub const BODY_TYPE_FILE: &str = "body_type.json";
pub const POSES_FILE: &str = "poses.json";
pub const MAKEUP_FILE: &str = "makeup.json";

/// Shared list files at the data root, with the key holding each list.
pub const SHARED_FILES: [SharedFile; 3] = [
    SharedFile {
        field: options::BACKGROUND,
        file: "backgrounds.json",
        key: "backgrounds",
    },
    SharedFile {
        field: options::RACE,
        file: "race.json",
        key: "races",
    },
    SharedFile {
        field: options::AGE_GROUP,
        file: "age_groups.json",
        key: "age_groups",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedFile {
    pub field: &'static str,
    pub file: &'static str,
    pub key: &'static str,
}

/// Where everything lives under one data root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn outfit_dir(&self) -> PathBuf {
        self.root.join(OUTFIT_DIR)
    }

    pub fn category_dir(&self, category: &str) -> PathBuf {
        self.outfit_dir().join(category)
    }

    pub fn shared_path(&self, shared: &SharedFile) -> PathBuf {
        self.root.join(shared.file)
    }

    pub fn presets_path(&self) -> PathBuf {
        self.root.join(crate::presets::PRESETS_FILE)
    }
}

/// Lists loaded once and shared by every category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedOptions {
    pub backgrounds: Vec<String>,
    pub races: Vec<String>,
    pub age_groups: Vec<String>,
}

// ── File shapes ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct AttireFile {
    #[serde(default)]
    attire: Vec<AttireItem>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AttireItem {
    Record {
        #[serde(rename = "type")]
        kind: String,
    },
    Plain(String),
}

impl AttireItem {
    fn into_kind(self) -> String {
        match self {
            AttireItem::Record { kind } | AttireItem::Plain(kind) => kind,
        }
    }
}

// ── Discovery ───────────────────────────────────────────────────

/// Category names: one per subdirectory of `<root>/outfit`, sorted.
pub fn discover_categories(layout: &DataLayout) -> Vec<String> {
    let dir = layout.outfit_dir();
    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "no outfit data directory");
            return Vec::new();
        }
    };
    let mut categories: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    categories.sort();
    categories
}

/// Body-part field names in a category directory, sorted by file name.
///
/// Every `*.json` except the body type, poses and makeup files counts, unless
/// its stem is already a selection key (`seed`, `race`, `makeup_1_type`, ...).
pub fn discover_body_parts(category_dir: &Path) -> Vec<String> {
    let entries = match std::fs::read_dir(category_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %category_dir.display(), error = %e, "cannot scan category");
            return Vec::new();
        }
    };
    let mut parts: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .filter(|p| {
            p.file_name()
                .is_some_and(|n| n != BODY_TYPE_FILE && n != POSES_FILE && n != MAKEUP_FILE)
        })
        .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().to_string()))
        .filter(|stem| {
            let reserved = selection::is_reserved_key(stem);
            if reserved {
                warn!(part = %stem, "body part name shadows a selection field; skipped");
            }
            !reserved
        })
        .collect();
    parts.sort();
    parts
}

// ── Loading ─────────────────────────────────────────────────────

/// Read and parse a JSON file; `Ok(None)` when it does not exist.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, LoadError> {
    if !path.exists() {
        return Ok(None);
    }
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| LoadError::Json {
            path: display,
            source,
        })
}

fn attire_types(path: &Path) -> Result<Option<Vec<String>>, LoadError> {
    let file: Option<AttireFile> = read_json(path)?;
    Ok(file.map(|f| f.attire.into_iter().map(AttireItem::into_kind).collect()))
}

fn keyed_list(path: &Path, key: &str) -> Result<Option<Vec<String>>, LoadError> {
    let Some(data) = read_json::<Value>(path)? else {
        return Ok(None);
    };
    let shape_err = || LoadError::Shape {
        path: path.display().to_string(),
        key: key.to_string(),
    };
    match data.get(key) {
        None if data.is_object() => Ok(Some(Vec::new())),
        None => Err(shape_err()),
        Some(list) => serde_json::from_value(list.clone())
            .map(Some)
            .map_err(|_| shape_err()),
    }
}

/// Types from an `{"attire": [...]}` file, or none on any failure.
fn types_or_empty(path: &Path) -> Vec<String> {
    match attire_types(path) {
        Ok(types) => types.unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "falling back to empty options");
            Vec::new()
        }
    }
}

/// `["none", "random"] + attire types` for one body part or body-type file.
pub fn load_attire_options(path: &Path) -> Vec<String> {
    options::with_sentinels(types_or_empty(path))
}

/// `["none"] + makeup types`.
pub fn load_makeup_options(path: &Path) -> Vec<String> {
    options::with_none(types_or_empty(path))
}

/// `["none", "random"] + <key>` from a `{"<key>": [string, ...]}` file.
pub fn load_keyed_options(path: &Path, key: &str) -> Vec<String> {
    let values = match keyed_list(path, key) {
        Ok(values) => values.unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "falling back to empty options");
            Vec::new()
        }
    };
    options::with_sentinels(values)
}

pub fn load_shared(layout: &DataLayout) -> SharedOptions {
    let [backgrounds, races, age_groups] =
        SHARED_FILES.map(|s| load_keyed_options(&layout.shared_path(&s), s.key));
    SharedOptions {
        backgrounds,
        races,
        age_groups,
    }
}

/// Build the option table for one category.
pub fn load_option_table(layout: &DataLayout, category: &str, shared: &SharedOptions) -> OptionTable {
    let dir = layout.category_dir(category);
    let mut table = OptionTable::new(category);
    set_full(&mut table, options::AGE_GROUP, &shared.age_groups);
    set_full(&mut table, options::RACE, &shared.races);
    set_full(&mut table, options::BACKGROUND, &shared.backgrounds);
    set_full(
        &mut table,
        options::BODY_TYPE,
        &load_attire_options(&dir.join(BODY_TYPE_FILE)),
    );
    set_full(
        &mut table,
        options::POSE,
        &load_keyed_options(&dir.join(POSES_FILE), "poses"),
    );
    table.set_options(
        options::MAKEUP,
        types_or_empty(&dir.join(MAKEUP_FILE)),
    );
    for part in discover_body_parts(&dir) {
        let opts = load_attire_options(&dir.join(format!("{part}.json")));
        set_full(&mut table, &part, &opts);
    }
    debug!(
        category,
        body_parts = table.body_parts().len(),
        "loaded option table"
    );
    table
}

/// Load every category under the data root, sharing one read of the
/// shared files.
pub fn load_all(layout: &DataLayout) -> Vec<OptionTable> {
    let shared = load_shared(layout);
    discover_categories(layout)
        .iter()
        .map(|category| load_option_table(layout, category, &shared))
        .collect()
}

/// Store an already sentinel-prefixed list.
fn set_full(table: &mut OptionTable, field: &str, full: &[String]) {
    table.set_options(field, full.iter().skip(2).cloned());
}
