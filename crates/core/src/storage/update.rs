//! Pure functions that turn entities into column/value sets.

use super::{Entity, EntityKey, SqlValue};

/// Column/value pairs for an insert or update statement.
pub type Changes = Vec<(&'static str, SqlValue)>;

/// Builds the sparse update set for a partial update.
///
/// Only columns whose value differs from the zero value of its type are
/// included. A field cannot be reset to `0`, `0.0` or `""` through this path.
pub fn sparse_changes<E: Entity>(entity: &E) -> Changes {
    E::columns()
        .iter()
        .filter_map(|mapping| {
            let value = mapping.value(entity);
            (!value.is_zero()).then_some((mapping.column, value))
        })
        .collect()
}

/// Builds the full column set for an insert.
///
/// Caller-supplied keys are included; store-assigned keys are not.
pub fn insert_values<E: Entity>(entity: &E) -> Changes {
    let mut values = Vec::with_capacity(E::columns().len() + 1);
    if !E::GENERATED_KEY {
        values.push((E::KEY_COLUMN, entity.key().to_value()));
    }
    values.extend(
        E::columns()
            .iter()
            .map(|mapping| (mapping.column, mapping.value(entity))),
    );
    values
}

/// Column names that filters and sorts may reference.
///
/// The key column comes first and is the default sort column.
pub fn column_whitelist<E: Entity>() -> Vec<&'static str> {
    let mut names = Vec::with_capacity(E::columns().len() + 3);
    names.push(E::KEY_COLUMN);
    names.extend(E::columns().iter().map(|mapping| mapping.column));
    names.push("created_at");
    names.push("updated_at");
    names
}
