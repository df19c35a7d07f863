//! Browser console bindings.

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    fn error(s: &str);
}

/// Log a message to the browser console.
pub fn console_log(msg: &str) {
    log(msg);
}

/// Log an error to the browser console.
pub fn console_error(msg: &str) {
    error(msg);
}

/// Forward Rust panics to `console.error`. Later calls are no-ops.
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}
