use serde::Serialize;
use sha2::{Digest, Sha256};

/// Sentinel: leave the field out of the prompt.
pub const NONE: &str = "none";
/// Sentinel: pick a concrete option with the call's RNG.
pub const RANDOM: &str = "random";

pub const AGE_GROUP: &str = "age_group";
pub const RACE: &str = "race";
pub const BODY_TYPE: &str = "body_type";
pub const POSE: &str = "pose";
pub const BACKGROUND: &str = "background";
pub const MAKEUP: &str = "makeup";

/// Single-choice fields every category has, in prompt order.
pub const FIXED_FIELDS: [&str; 5] = [AGE_GROUP, RACE, BODY_TYPE, POSE, BACKGROUND];

pub fn is_sentinel(value: &str) -> bool {
    value == NONE || value == RANDOM
}

/// `["none", "random"]` followed by `values`.
pub fn with_sentinels<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out = vec![NONE.to_string(), RANDOM.to_string()];
    out.extend(values.into_iter().map(Into::into));
    out
}

/// `["none"]` followed by `values` (makeup has no single-choice random).
pub fn with_none<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out = vec![NONE.to_string()];
    out.extend(values.into_iter().map(Into::into));
    out
}

/// A selectable attire field backed by one data file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BodyPart {
    pub name: String,
    pub options: Vec<String>,
}

impl BodyPart {
    /// Options minus the sentinels.
    pub fn real_options(&self) -> Vec<&str> {
        real_options(&self.options)
    }
}

pub fn real_options(options: &[String]) -> Vec<&str> {
    options
        .iter()
        .map(String::as_str)
        .filter(|o| !is_sentinel(o))
        .collect()
}

/// Allowed options for every field of one category.
///
/// Built once by the loader and read-only afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionTable {
    category: String,
    age_group: Vec<String>,
    race: Vec<String>,
    body_type: Vec<String>,
    body_parts: Vec<BodyPart>,
    makeup: Vec<String>,
    pose: Vec<String>,
    background: Vec<String>,
}

impl OptionTable {
    /// A table whose lists hold only their sentinels.
    pub fn new(category: impl Into<String>) -> Self {
        let empty = || with_sentinels(Vec::<String>::new());
        Self {
            category: category.into(),
            age_group: empty(),
            race: empty(),
            body_type: empty(),
            body_parts: Vec::new(),
            makeup: with_none(Vec::<String>::new()),
            pose: empty(),
            background: empty(),
        }
    }

    /// Replace a field's real options. Unknown field names become body parts,
    /// appended after any existing ones.
    pub fn with_options<I, S>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_options(field, values);
        self
    }

    pub(crate) fn set_options<I, S>(&mut self, field: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = match field {
            MAKEUP => {
                self.makeup = with_none(values);
                return;
            }
            AGE_GROUP => &mut self.age_group,
            RACE => &mut self.race,
            BODY_TYPE => &mut self.body_type,
            POSE => &mut self.pose,
            BACKGROUND => &mut self.background,
            part => {
                let options = with_sentinels(values);
                match self.body_parts.iter_mut().find(|p| p.name == part) {
                    Some(existing) => existing.options = options,
                    None => self.body_parts.push(BodyPart {
                        name: part.to_string(),
                        options,
                    }),
                }
                return;
            }
        };
        *list = with_sentinels(values);
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Body parts in discovery order.
    pub fn body_parts(&self) -> &[BodyPart] {
        &self.body_parts
    }

    pub fn body_part(&self, name: &str) -> Option<&BodyPart> {
        self.body_parts.iter().find(|p| p.name == name)
    }

    pub fn makeup(&self) -> &[String] {
        &self.makeup
    }

    /// Option list for any field name, including body parts and `makeup`.
    pub fn options(&self, field: &str) -> Option<&[String]> {
        match field {
            AGE_GROUP => Some(&self.age_group),
            RACE => Some(&self.race),
            BODY_TYPE => Some(&self.body_type),
            POSE => Some(&self.pose),
            BACKGROUND => Some(&self.background),
            MAKEUP => Some(&self.makeup),
            part => self.body_part(part).map(|p| p.options.as_slice()),
        }
    }

    /// All field names in prompt order.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names = vec![AGE_GROUP, RACE, BODY_TYPE];
        names.extend(self.body_parts.iter().map(|p| p.name.as_str()));
        names.extend([MAKEUP, POSE, BACKGROUND]);
        names
    }

    /// `sha256:<hex>` of the table's canonical JSON.
    ///
    /// Together with the seed this pins down every random resolution.
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::to_string(self).unwrap_or_default();
        format!("sha256:{:x}", Sha256::digest(canonical.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_table_holds_only_sentinels() {
        let table = OptionTable::new("female");
        for field in FIXED_FIELDS {
            assert_eq!(table.options(field).unwrap(), ["none", "random"]);
        }
        assert_eq!(table.makeup(), ["none"]);
        assert!(table.body_parts().is_empty());
    }

    #[test]
    fn with_options_keeps_sentinel_prefix_and_order() {
        let table = OptionTable::new("female")
            .with_options(RACE, ["elf", "human", "elf"])
            .with_options("torso", ["t-shirt", "hoodie"])
            .with_options(MAKEUP, ["blush"]);

        assert_eq!(
            table.options(RACE).unwrap(),
            ["none", "random", "elf", "human", "elf"]
        );
        assert_eq!(
            table.options("torso").unwrap(),
            ["none", "random", "t-shirt", "hoodie"]
        );
        assert_eq!(table.options(MAKEUP).unwrap(), ["none", "blush"]);
        assert_eq!(table.options("legs"), None);
    }

    #[test]
    fn body_part_replaced_in_place() {
        let table = OptionTable::new("male")
            .with_options("torso", ["a"])
            .with_options("legs", ["b"])
            .with_options("torso", ["c"]);
        let names: Vec<_> = table.body_parts().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["torso", "legs"]);
        assert_eq!(table.body_part("torso").unwrap().real_options(), ["c"]);
    }

    #[test]
    fn field_names_follow_prompt_order() {
        let table = OptionTable::new("x")
            .with_options("torso", ["a"])
            .with_options("feet", ["b"]);
        assert_eq!(
            table.field_names(),
            [
                "age_group",
                "race",
                "body_type",
                "torso",
                "feet",
                "makeup",
                "pose",
                "background"
            ]
        );
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = OptionTable::new("x").with_options(POSE, ["standing"]);
        let b = OptionTable::new("x").with_options(POSE, ["standing"]);
        let c = OptionTable::new("x").with_options(POSE, ["sitting"]);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert!(a.fingerprint().starts_with("sha256:"));
    }
}
