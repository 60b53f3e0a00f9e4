//! Studio session.
//!
//! This module provides:
//! - `session`: the `Studio` facade tying the form state, character library, orchestrator and
//!   persistence together
//! - `wasm`: JavaScript bindings and a `localStorage`-backed store (feature `wasm`)

pub mod session;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use session::{Studio, StudioSnapshot};

#[cfg(feature = "wasm")]
pub use wasm::{JsStudio, LocalStorage};
