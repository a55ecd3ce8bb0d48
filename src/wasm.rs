//! WebAssembly glue. A panicking wasm module normally just aborts; routing
//! panic messages to the browser console is the only way to see them.

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}
