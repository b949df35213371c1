//! Negative-cache placeholder.
//!
//! A key that the store confirmed absent is cached as [`PLACEHOLDER`] for
//! [`PLACEHOLDER_TTL`], so repeated lookups of it never reach the store.

use std::time::Duration;

/// Sentinel value marking a confirmed-absent key.
///
/// Serialized entities are JSON objects, so they can never equal this value.
pub const PLACEHOLDER: &[u8] = b"*";

/// Lifetime of a placeholder entry.
pub const PLACEHOLDER_TTL: Duration = Duration::from_secs(10 * 60);

/// Returns true if the cached bytes are the placeholder sentinel.
pub fn is_placeholder(value: &[u8]) -> bool {
    value == PLACEHOLDER
}

/// Result of a typed cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// A real cached value.
    Hit(T),
    /// The key is cached as confirmed-absent.
    Placeholder,
    /// The key is not cached.
    Miss,
}

impl<T> Lookup<T> {
    /// Returns true for the negative-cache signal.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Lookup::Placeholder)
    }
}
