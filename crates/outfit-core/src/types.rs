use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// How the per-call seed is derived.
///
/// Parsing never fails: any string other than the four known modes is
/// treated as [`SeedMode::Fixed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedMode {
    Fixed,
    #[default]
    Random,
    Increment,
    Decrement,
}

impl SeedMode {
    pub fn parse(s: &str) -> Self {
        match s {
            "random" => SeedMode::Random,
            "increment" => SeedMode::Increment,
            "decrement" => SeedMode::Decrement,
            _ => SeedMode::Fixed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SeedMode::Fixed => "fixed",
            SeedMode::Random => "random",
            SeedMode::Increment => "increment",
            SeedMode::Decrement => "decrement",
        }
    }

    /// Modes that step from the previous seed and so need [`SeedState`].
    pub fn is_stepping(self) -> bool {
        matches!(self, SeedMode::Increment | SeedMode::Decrement)
    }
}

impl fmt::Display for SeedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SeedMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SeedMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(SeedMode::parse(&s))
    }
}

/// Seed carried between invocations by the caller.
///
/// A `last_seed` of 0 means "no previous seed": stepping modes then start
/// from the requested seed instead of stepping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedState {
    pub last_seed: u32,
}

impl SeedState {
    pub fn new(last_seed: u32) -> Self {
        Self { last_seed }
    }

    /// Store the seed just used when the mode steps from it.
    pub fn record(&mut self, mode: SeedMode, used_seed: u32) {
        if mode.is_stepping() {
            self.last_seed = used_seed;
        }
    }
}

/// One structured makeup selection as sent in `makeup_data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MakeupEntry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_intensity")]
    pub intensity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl MakeupEntry {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            enabled: true,
            intensity: default_intensity(),
            color: None,
        }
    }

    /// `blush (pink, light)` or `blush (light)`; `None` when disabled or unset.
    pub fn render(&self) -> Option<String> {
        if !self.enabled || is_unset_kind(&self.kind) {
            return None;
        }
        match self.color.as_deref() {
            Some(color) if !color.is_empty() && color != crate::options::NONE => Some(format!(
                "{} ({color}, {})",
                self.kind, self.intensity
            )),
            _ => Some(format!("{} ({})", self.kind, self.intensity)),
        }
    }
}

/// One makeup slot from the older per-widget host UI
/// (`makeup_<index>_type`, `makeup_<index>_intensity`, `makeup_<index>_enabled`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyMakeupWidget {
    pub index: u32,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "default_intensity")]
    pub intensity: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl LegacyMakeupWidget {
    pub fn render(&self) -> Option<String> {
        if !self.enabled || is_unset_kind(&self.kind) {
            return None;
        }
        Some(format!("{} ({})", self.kind, self.intensity))
    }
}

fn is_unset_kind(kind: &str) -> bool {
    kind.is_empty() || kind == crate::options::NONE
}

fn default_enabled() -> bool {
    true
}

pub(crate) fn default_intensity() -> String {
    "medium".to_string()
}
