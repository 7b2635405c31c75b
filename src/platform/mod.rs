//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time/ticks
//! - Input events
//! - Storage (LocalStorage on web)

pub mod input;
pub mod storage;
pub mod time;

pub use input::{InputState, TouchSample};
pub use storage::{KeyValueStore, MemoryStore};
pub use time::FrameClock;

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStore;
