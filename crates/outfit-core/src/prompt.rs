use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::makeup;
use crate::options::{self, OptionTable, NONE, RANDOM};
use crate::seed;
use crate::selection::Selection;
use crate::types::SeedState;

/// Build the prompt line for one invocation.
///
/// Returns the prompt and the seed actually used. The caller stores the
/// seed in its [`SeedState`] for the next call.
pub fn build(selection: &Selection, seed_state: SeedState, table: &OptionTable) -> (String, u32) {
    let used_seed = seed::resolve_seed(selection.seed_mode, selection.seed, seed_state);
    debug!(
        category = table.category(),
        seed = used_seed,
        mode = %selection.seed_mode,
        "resolved seed"
    );
    (render(selection, table, used_seed), used_seed)
}

/// Assemble the prompt with every `"random"` drawn from a generator seeded
/// with `seed`.
pub fn render(selection: &Selection, table: &OptionTable, seed: u32) -> String {
    let mut rng = seed::rng_for(seed);
    let mut parts: Vec<String> = Vec::with_capacity(9);

    let name = selection.character_name.trim();
    if !name.is_empty() {
        parts.push(format!("Character: {name}"));
    }

    for (field, label) in [
        (options::AGE_GROUP, "Age"),
        (options::RACE, "Race"),
        (options::BODY_TYPE, "Body type"),
    ] {
        if let Some(value) = resolve(selection.choice(field), table.options(field), &mut rng) {
            parts.push(format!("{label}: {value}"));
        }
    }

    let attire: Vec<String> = table
        .body_parts()
        .iter()
        .filter_map(|part| {
            resolve(
                selection.attire_choice(&part.name),
                Some(part.options.as_slice()),
                &mut rng,
            )
            .map(|value| format!("{}: {value}", part.name))
        })
        .collect();
    if !attire.is_empty() {
        parts.push(format!("Attire: {}", attire.join(", ")));
    }

    if let Some(segment) = makeup::render_segment(&selection.makeup, &selection.legacy_makeup) {
        parts.push(segment);
    }

    for (field, label) in [(options::POSE, "Pose"), (options::BACKGROUND, "Background")] {
        if let Some(value) = resolve(selection.choice(field), table.options(field), &mut rng) {
            parts.push(format!("{label}: {value}"));
        }
    }

    let custom = selection.custom_attributes.trim();
    if !custom.is_empty() {
        parts.push(format!("Additional: {custom}"));
    }

    parts.join(", ")
}

/// Concrete value for one choice, or `None` when the field is left out.
///
/// `"random"` picks uniformly among the non-sentinel options and drops the
/// field when there are none.
fn resolve<'a, R: Rng + ?Sized>(
    choice: &'a str,
    allowed: Option<&'a [String]>,
    rng: &mut R,
) -> Option<&'a str> {
    match choice {
        NONE => None,
        RANDOM => {
            let real = options::real_options(allowed.unwrap_or_default());
            real.choose(rng).copied()
        }
        value => Some(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MakeupEntry, SeedMode};

    fn table() -> OptionTable {
        OptionTable::new("female")
            .with_options("age_group", ["adult", "elder"])
            .with_options("race", ["elf", "human", "dwarf"])
            .with_options("body_type", ["slim", "athletic"])
            .with_options("torso", ["blouse", "tank top", "hoodie"])
            .with_options("legs", ["skirt", "jeans"])
            .with_options("pose", ["standing", "sitting"])
            .with_options("background", ["forest", "beach"])
    }

    fn all_random(seed: u32) -> Selection {
        let mut sel = Selection::fixed(seed);
        sel.age_group = RANDOM.into();
        sel.race = RANDOM.into();
        sel.body_type = RANDOM.into();
        sel.attire.insert("torso".into(), RANDOM.into());
        sel.attire.insert("legs".into(), RANDOM.into());
        sel.pose = RANDOM.into();
        sel.background = RANDOM.into();
        sel
    }

    #[test]
    fn all_none_is_empty() {
        let (prompt, seed) = build(&Selection::fixed(3), SeedState::default(), &table());
        assert_eq!(prompt, "");
        assert_eq!(seed, 3);
    }

    #[test]
    fn name_and_race_only() {
        let mut sel = Selection::fixed(0);
        sel.character_name = "Mira".into();
        sel.race = "elf".into();
        let (prompt, _) = build(&sel, SeedState::default(), &table());
        assert_eq!(prompt, "Character: Mira, Race: elf");
    }

    #[test]
    fn full_order_and_labels() {
        let mut sel = Selection::fixed(0);
        sel.character_name = "  Ava ".into();
        sel.age_group = "adult".into();
        sel.race = "human".into();
        sel.body_type = "athletic".into();
        sel.attire.insert("torso".into(), "hoodie".into());
        sel.attire.insert("legs".into(), "jeans".into());
        sel.makeup = vec![MakeupEntry {
            color: Some("pink".into()),
            intensity: "light".into(),
            ..MakeupEntry::new("blush")
        }];
        sel.pose = "standing".into();
        sel.background = "beach".into();
        sel.custom_attributes = " crisp focus \n".into();

        let (prompt, _) = build(&sel, SeedState::default(), &table());
        assert_eq!(
            prompt,
            "Character: Ava, Age: adult, Race: human, Body type: athletic, \
             Attire: torso: hoodie, legs: jeans, Makeup: blush (pink, light), \
             Pose: standing, Background: beach, Additional: crisp focus"
        );
    }

    #[test]
    fn attire_follows_table_order_not_selection_order() {
        let mut sel = Selection::fixed(0);
        sel.attire.insert("legs".into(), "skirt".into());
        sel.attire.insert("torso".into(), "blouse".into());
        let (prompt, _) = build(&sel, SeedState::default(), &table());
        assert_eq!(prompt, "Attire: torso: blouse, legs: skirt");
    }

    #[test]
    fn fixed_seed_is_reproducible() {
        let sel = all_random(42);
        let first = build(&sel, SeedState::default(), &table());
        let second = build(&sel, SeedState::default(), &table());
        assert_eq!(first, second);
        assert_eq!(first.1, 42);
    }

    #[test]
    fn random_always_resolves_to_real_option() {
        let table = table();
        for seed in 0..50 {
            let prompt = render(&all_random(seed), &table, seed);
            assert!(!prompt.contains("random"), "seed {seed}: {prompt}");
            assert!(prompt.starts_with("Age: "), "seed {seed}: {prompt}");
            assert!(prompt.contains("Attire: torso: "), "seed {seed}: {prompt}");
            assert!(prompt.contains("Background: "), "seed {seed}: {prompt}");
        }
    }

    #[test]
    fn random_choices_vary_with_seed() {
        let table = table();
        let distinct: std::collections::BTreeSet<String> = (0..50)
            .map(|seed| render(&all_random(seed), &table, seed))
            .collect();
        assert!(distinct.len() > 1);
    }

    #[test]
    fn random_with_no_real_options_is_dropped() {
        let table = OptionTable::new("x")
            .with_options("torso", Vec::<String>::new())
            .with_options("legs", ["jeans"]);
        let mut sel = Selection::fixed(1);
        sel.attire.insert("torso".into(), RANDOM.into());
        sel.attire.insert("legs".into(), RANDOM.into());
        sel.race = RANDOM.into();
        let (prompt, _) = build(&sel, SeedState::default(), &table);
        assert_eq!(prompt, "Attire: legs: jeans");

        sel.attire.insert("legs".into(), NONE.into());
        let (prompt, _) = build(&sel, SeedState::default(), &table);
        assert_eq!(prompt, "");
    }

    #[test]
    fn stepping_modes_use_seed_state() {
        let mut sel = Selection::fixed(5);
        sel.seed_mode = SeedMode::Increment;
        let (_, first) = build(&sel, SeedState::new(0), &table());
        assert_eq!(first, 5);
        let (_, second) = build(&sel, SeedState::new(first), &table());
        assert_eq!(second, 6);

        sel.seed_mode = SeedMode::Decrement;
        let (_, down) = build(&sel, SeedState::new(1), &table());
        assert_eq!(down, 0);
        let (_, boot) = build(&sel, SeedState::new(down), &table());
        assert_eq!(boot, 5);
    }

    #[test]
    fn same_used_seed_same_prompt_across_modes() {
        let mut inc = all_random(10);
        inc.seed_mode = SeedMode::Increment;
        let (stepped, seed) = build(&inc, SeedState::new(41), &table());
        assert_eq!(seed, 42);
        let (fixed, _) = build(&all_random(42), SeedState::default(), &table());
        assert_eq!(stepped, fixed);
    }

    #[test]
    fn legacy_makeup_between_attire_and_pose() {
        let mut sel = Selection::fixed(0);
        sel.attire.insert("torso".into(), "blouse".into());
        sel.pose = "sitting".into();
        sel.legacy_makeup = vec![crate::types::LegacyMakeupWidget {
            index: 1,
            kind: "eyeliner".into(),
            intensity: "bold".into(),
            enabled: true,
        }];
        let (prompt, _) = build(&sel, SeedState::default(), &table());
        assert_eq!(
            prompt,
            "Attire: torso: blouse, Makeup: eyeliner (bold), Pose: sitting"
        );
    }
}
