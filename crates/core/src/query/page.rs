use super::{Page, Params, QueryError, IGNORE_COUNT};

/// Page size used when a request leaves `limit` at zero.
pub const DEFAULT_LIMIT: u32 = 20;

/// Largest page size a request may ask for.
pub const MAX_LIMIT: u32 = 1000;

/// Builds an `ORDER BY` clause from a comma-separated sort string.
///
/// A `-` prefix sorts that column descending. A sort without any column
/// (empty, only separators, or the `ignore count` marker) falls back to the
/// first whitelisted column, descending.
pub fn build_order(sort: &str, whitelist: &[&str]) -> Result<String, QueryError> {
    let default = || format!("{} DESC", whitelist.first().copied().unwrap_or("id"));
    let sort = sort.trim();
    if sort == IGNORE_COUNT {
        return Ok(default());
    }

    let mut terms = Vec::new();
    for term in sort.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let (column, direction) = match term.strip_prefix('-') {
            Some(column) => (column.trim(), "DESC"),
            None => (term.strip_prefix('+').unwrap_or(term).trim(), "ASC"),
        };
        if !whitelist.contains(&column) {
            return Err(QueryError::UnknownColumn(column.to_string()));
        }
        terms.push(format!("{column} {direction}"));
    }

    if terms.is_empty() {
        return Ok(default());
    }
    Ok(terms.join(", "))
}

/// Builds the order and window of a list request.
pub fn build_page(params: &Params, whitelist: &[&str]) -> Result<Page, QueryError> {
    let limit = match params.limit {
        0 => DEFAULT_LIMIT,
        limit => limit.min(MAX_LIMIT),
    };

    Ok(Page {
        order: build_order(&params.sort, whitelist)?,
        limit: Some(limit),
        offset: params.page.saturating_mul(limit),
    })
}
