//! Foundational low-level utilities shared across Granat crates.
//!
//! Provides the text normalization used by catalog search and chat trigger
//! matching, plus the wall-clock helpers used by cache expiry.

pub mod text_normalize;
pub mod time_utils;

pub use text_normalize::{normalize_text, split_normalized_list};
pub use time_utils::{current_unix_timestamp_ms, elapsed_ms_since, is_within_ttl};
