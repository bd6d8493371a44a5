//! Perspect WASM - WebAssembly bindings for the crop geometry engine
//!
//! This crate exposes the perspect-core crop session to JavaScript/TypeScript
//! shells. The bindings are deliberately thin: all geometry lives in the core
//! crate, and this layer only converts between Rust state and JS values.
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsCropSession } from '@perspect/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const session = new JsCropSession(6000, 4000);
//! session.begin_resize(4, false); // bottom-right handle
//! session.drag_by(0.05, 0.02);
//! const committed = session.end_gesture();
//! ```

use wasm_bindgen::prelude::*;

mod session;

pub use session::JsCropSession;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    // Future: install a panic hook for readable messages in the browser
    // console when the console_error_panic_hook feature is added
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
