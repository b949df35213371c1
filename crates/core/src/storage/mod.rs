mod error;
mod traits;
mod types;
mod update;
mod value;

pub use error::{RepositoryError, Result};
pub use traits::Store;
pub use types::{ColumnMapping, Entity, EntityKey};
pub use update::{column_whitelist, insert_values, sparse_changes, Changes};
pub use value::SqlValue;
