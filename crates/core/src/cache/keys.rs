use std::fmt::Display;

/// Returns the cache key for one entity record.
///
/// # Examples
///
/// ```
/// use helmsman_core::cache::entity_key;
///
/// assert_eq!(entity_key("trades", 42), "trades:42");
/// ```
pub fn entity_key(entity: &str, key: impl Display) -> String {
    format!("{entity}:{key}")
}

/// Returns the cache keys for a batch of records, in input order.
pub fn entity_keys<K: Display>(entity: &str, keys: &[K]) -> Vec<String> {
    keys.iter().map(|key| entity_key(entity, key)).collect()
}
