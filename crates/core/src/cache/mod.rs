mod error;
mod keys;
mod placeholder;
mod serialization;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{entity_key, entity_keys};
pub use placeholder::{is_placeholder, Lookup, PLACEHOLDER, PLACEHOLDER_TTL};
pub use serialization::{from_bytes, to_bytes};
pub use traits::Cache;
