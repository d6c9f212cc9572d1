#![no_main]
use libfuzzer_sys::fuzz_target;
use outfit_core::options::OptionTable;
use outfit_core::prompt;
use outfit_core::selection::Selection;
use outfit_core::types::SeedState;

fuzz_target!(|data: &[u8]| {
    let table = OptionTable::new("fuzz")
        .with_options("race", ["elf", "human"])
        .with_options("torso", ["blouse"])
        .with_options("pose", ["standing"]);
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        if let Ok(sel) = Selection::from_fields(&value, &table) {
            let _ = prompt::build(&sel, SeedState::default(), &table);
        }
    }
});
