#![no_main]
use libfuzzer_sys::fuzz_target;
use outfit_core::makeup;

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data) {
        let entries = makeup::parse_makeup_data(raw);
        let _ = makeup::render_segment(&entries, &[]);
    }
});
