#![no_main]

use expogrid_store::{EditorState, Store};
use libfuzzer_sys::fuzz_target;

// Arbitrary bytes must either fail to decode or restore cleanly.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(state) = EditorState::from_json(text) else {
        return;
    };
    let mut store = Store::default();
    store.restore(state);
    let _ = store.serialize().to_json();
});
