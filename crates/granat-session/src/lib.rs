//! Per-chat conversation state for Granat.

pub mod session_state;
pub mod session_store;

pub use session_state::*;
pub use session_store::*;
