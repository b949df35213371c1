//! Request parameters for list and condition queries.
//!
//! Conditions arrive as JSON and are compiled against a per-entity column
//! whitelist into parameterized SQL fragments. Values never reach the SQL
//! text; only whitelisted column names do.

mod build;
mod error;
mod page;
mod params;

pub use build::build_query;
pub use error::QueryError;
pub use page::{build_order, build_page, DEFAULT_LIMIT, MAX_LIMIT};
pub use params::{Column, Conditions, Filter, Page, Params, IGNORE_COUNT};
