#![no_main]
use arbor::games::GridState;
use libfuzzer_sys::fuzz_target;
use pretty_assertions::assert_eq;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(state) = GridState::try_from(s) {
            let serialized = state.to_string();
            let parsed = GridState::try_from(serialized.as_str())
                .expect("printed boards are parsed back");
            assert_eq!(parsed, state);
        }
    }
});
