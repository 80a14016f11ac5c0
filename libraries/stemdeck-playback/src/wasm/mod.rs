//! WASM bindings for stemdeck-playback
//!
//! Browser audio elements as a `MediaBackend`, and a JavaScript-friendly
//! wrapper around `PlaybackController` for the player UI.

pub mod backend;
pub mod player;

pub use backend::{HtmlMediaBackend, MediaEventQueue};
pub use player::WasmStemPlayer;
