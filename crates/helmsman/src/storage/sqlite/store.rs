//! Generic SQLite store.
//!
//! Implements `helmsman_core::storage::Store` for every [`SqlEntity`] using
//! a shared `SqlitePool`. Pool and transaction operations share the same
//! statement helpers, which run on a borrowed `SqliteConnection`.

use std::marker::PhantomData;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::query::Query;
use sqlx::sqlite::{
    SqliteArguments, SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions,
};
use sqlx::{Row, Sqlite, Transaction};

use helmsman_core::query::{Filter, Page};
use helmsman_core::storage::{
    column_whitelist, insert_values, EntityKey, RepositoryError, Result, SqlValue, Store,
};

use super::conversions::{format_datetime, SqlEntity};
use super::error::{map_sqlx_error, map_sqlx_error_with_id};
use super::schema::{CREATE_TABLES, LIVE_ROWS};

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Opens the database and creates the schema.
///
/// `:memory:` opens a private in-memory database on a single connection.
/// Any other path is a file that is created if missing.
pub async fn connect(path: &str) -> Result<SqlitePool> {
    let pool = if path == ":memory:" {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;
        // The database lives as long as its only connection
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
    } else {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        SqlitePoolOptions::new().connect_with(options).await
    }
    .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

    sqlx::query(CREATE_TABLES)
        .execute(&pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

    tracing::debug!(path, "SQLite schema ready");
    Ok(pool)
}

/// SQLite-backed store for one entity type.
pub struct SqliteStore<E> {
    pool: SqlitePool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> SqliteStore<E> {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }
}

fn bind_value<'q>(query: SqliteQuery<'q>, value: &SqlValue) -> SqliteQuery<'q> {
    match value {
        SqlValue::Int(v) => query.bind(*v),
        SqlValue::Real(v) => query.bind(*v),
        SqlValue::Text(v) => query.bind(v.clone()),
        SqlValue::Null => query.bind(None::<String>),
    }
}

fn bind_all<'q>(query: SqliteQuery<'q>, values: &[SqlValue]) -> SqliteQuery<'q> {
    values.iter().fold(query, bind_value)
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn select_list<E: SqlEntity>() -> String {
    column_whitelist::<E>().join(", ")
}

/// Builds a `WHERE` clause from a filter plus the tombstone condition.
fn where_clause<E: SqlEntity>(filter: &Filter) -> String {
    let mut conditions = Vec::with_capacity(2);
    if !filter.is_empty() {
        conditions.push(format!("({})", filter.clause));
    }
    if E::SOFT_DELETE {
        conditions.push(LIVE_ROWS.to_string());
    }

    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

fn key_filter<E: SqlEntity>(key: E::Key) -> Filter {
    Filter::eq(E::KEY_COLUMN, key.to_value())
}

fn keys_filter<E: SqlEntity>(keys: &[E::Key]) -> Filter {
    Filter {
        clause: format!("{} IN ({})", E::KEY_COLUMN, placeholders(keys.len())),
        args: keys.iter().map(EntityKey::to_value).collect(),
    }
}

/// SQLite treats a negative limit as "no limit".
fn limit_value(page: &Page) -> i64 {
    page.limit.map(i64::from).unwrap_or(-1)
}

async fn select_rows<E: SqlEntity>(
    conn: &mut SqliteConnection,
    filter: &Filter,
    tail: &str,
    tail_args: &[SqlValue],
) -> Result<Vec<E>> {
    let sql = format!(
        "SELECT {} FROM {}{}{}",
        select_list::<E>(),
        E::TABLE,
        where_clause::<E>(filter),
        tail
    );

    let query = bind_all(bind_all(sqlx::query(&sql), &filter.args), tail_args);
    let rows = query
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error(e, E::NAME))?;

    rows.iter()
        .map(|row| E::from_row(row).map_err(|e| map_sqlx_error(e, E::NAME)))
        .collect()
}

async fn insert_row<E: SqlEntity>(conn: &mut SqliteConnection, entity: &E) -> Result<E::Key> {
    let values = insert_values(entity);
    let columns: Vec<&str> = values.iter().map(|(column, _)| *column).collect();
    let sql = format!(
        "INSERT INTO {} ({}, created_at, updated_at) VALUES ({}, ?, ?)",
        E::TABLE,
        columns.join(", "),
        placeholders(values.len()),
    );

    let now = format_datetime(&Utc::now());
    let args: Vec<SqlValue> = values.into_iter().map(|(_, value)| value).collect();
    let result = bind_all(sqlx::query(&sql), &args)
        .bind(now.clone())
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error_with_id(e, E::NAME, entity.key().to_string()))?;

    if E::GENERATED_KEY {
        E::Key::from_row_id(result.last_insert_rowid()).ok_or_else(|| {
            RepositoryError::InvalidData(format!(
                "{} row id out of range: {}",
                E::NAME,
                result.last_insert_rowid()
            ))
        })
    } else {
        Ok(entity.key())
    }
}

async fn update_row<E: SqlEntity>(
    conn: &mut SqliteConnection,
    key: E::Key,
    changes: &[(&'static str, SqlValue)],
) -> Result<()> {
    let mut assignments: Vec<String> = changes
        .iter()
        .map(|(column, _)| format!("{column} = ?"))
        .collect();
    assignments.push("updated_at = ?".to_string());

    let filter = key_filter::<E>(key);
    let sql = format!(
        "UPDATE {} SET {}{}",
        E::TABLE,
        assignments.join(", "),
        where_clause::<E>(&filter)
    );

    let args: Vec<SqlValue> = changes.iter().map(|(_, value)| value.clone()).collect();
    let result = bind_all(
        bind_all(sqlx::query(&sql), &args).bind(format_datetime(&Utc::now())),
        &filter.args,
    )
    .execute(&mut *conn)
    .await
    .map_err(|e| map_sqlx_error_with_id(e, E::NAME, key.to_string()))?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::not_found(E::NAME, key));
    }
    Ok(())
}

/// Deletes (or tombstones) the rows matching a key filter.
async fn delete_rows<E: SqlEntity>(conn: &mut SqliteConnection, filter: &Filter) -> Result<u64> {
    let result = if E::SOFT_DELETE {
        let sql = format!(
            "UPDATE {} SET deleted_at = ?{}",
            E::TABLE,
            where_clause::<E>(filter)
        );
        bind_all(
            sqlx::query(&sql).bind(format_datetime(&Utc::now())),
            &filter.args,
        )
        .execute(&mut *conn)
        .await
    } else {
        let sql = format!("DELETE FROM {}{}", E::TABLE, where_clause::<E>(filter));
        bind_all(sqlx::query(&sql), &filter.args)
            .execute(&mut *conn)
            .await
    }
    .map_err(|e| map_sqlx_error(e, E::NAME))?;

    Ok(result.rows_affected())
}

async fn delete_row<E: SqlEntity>(conn: &mut SqliteConnection, key: E::Key) -> Result<()> {
    match delete_rows::<E>(conn, &key_filter::<E>(key)).await? {
        0 => Err(RepositoryError::not_found(E::NAME, key)),
        _ => Ok(()),
    }
}

impl<E: SqlEntity> SqliteStore<E> {
    async fn acquire(&self) -> Result<sqlx::pool::PoolConnection<Sqlite>> {
        self.pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error(e, E::NAME))
    }
}

#[async_trait]
impl<E: SqlEntity> Store<E> for SqliteStore<E> {
    type Tx = Transaction<'static, Sqlite>;

    async fn insert(&self, entity: &E) -> Result<E::Key> {
        let mut conn = self.acquire().await?;
        insert_row(&mut conn, entity).await
    }

    async fn find(&self, key: E::Key) -> Result<Option<E>> {
        let mut conn = self.acquire().await?;
        let rows = select_rows::<E>(&mut conn, &key_filter::<E>(key), " LIMIT 1", &[]).await?;
        Ok(rows.into_iter().next())
    }

    async fn find_many(&self, keys: &[E::Key]) -> Result<Vec<E>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.acquire().await?;
        select_rows::<E>(&mut conn, &keys_filter::<E>(keys), "", &[]).await
    }

    async fn find_first(&self, filter: &Filter) -> Result<Option<E>> {
        let mut conn = self.acquire().await?;
        let tail = format!(" ORDER BY {} ASC LIMIT 1", E::KEY_COLUMN);
        let rows = select_rows::<E>(&mut conn, filter, &tail, &[]).await?;
        Ok(rows.into_iter().next())
    }

    async fn count(&self, filter: &Filter) -> Result<u64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {}{}",
            E::TABLE,
            where_clause::<E>(filter)
        );
        let row = bind_all(sqlx::query(&sql), &filter.args)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, E::NAME))?;
        let total: i64 = row.try_get(0).map_err(|e| map_sqlx_error(e, E::NAME))?;

        Ok(u64::try_from(total).unwrap_or_default())
    }

    async fn find_page(&self, filter: &Filter, page: &Page) -> Result<Vec<E>> {
        let mut conn = self.acquire().await?;
        let tail = format!(" ORDER BY {} LIMIT ? OFFSET ?", page.order);
        let tail_args = [
            SqlValue::Int(limit_value(page)),
            SqlValue::Int(i64::from(page.offset)),
        ];
        select_rows::<E>(&mut conn, filter, &tail, &tail_args).await
    }

    async fn find_before(&self, last_key: Option<E::Key>, page: &Page) -> Result<Vec<E>> {
        let filter = match last_key {
            Some(key) => Filter {
                clause: format!("{} < ?", E::KEY_COLUMN),
                args: vec![key.to_value()],
            },
            None => Filter::all(),
        };
        let mut conn = self.acquire().await?;
        let tail = format!(" ORDER BY {} LIMIT ?", page.order);
        select_rows::<E>(&mut conn, &filter, &tail, &[SqlValue::Int(limit_value(page))]).await
    }

    async fn update(&self, key: E::Key, changes: &[(&'static str, SqlValue)]) -> Result<()> {
        let mut conn = self.acquire().await?;
        update_row::<E>(&mut conn, key, changes).await
    }

    async fn delete(&self, key: E::Key) -> Result<()> {
        let mut conn = self.acquire().await?;
        delete_row::<E>(&mut conn, key).await
    }

    async fn delete_many(&self, keys: &[E::Key]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.acquire().await?;
        delete_rows::<E>(&mut conn, &keys_filter::<E>(keys)).await?;
        Ok(())
    }

    async fn begin(&self) -> Result<Self::Tx> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error(e, E::NAME))
    }

    async fn commit(&self, tx: Self::Tx) -> Result<()> {
        tx.commit().await.map_err(|e| map_sqlx_error(e, E::NAME))
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<()> {
        tx.rollback().await.map_err(|e| map_sqlx_error(e, E::NAME))
    }

    async fn insert_tx(&self, tx: &mut Self::Tx, entity: &E) -> Result<E::Key> {
        insert_row(&mut **tx, entity).await
    }

    async fn update_tx(
        &self,
        tx: &mut Self::Tx,
        key: E::Key,
        changes: &[(&'static str, SqlValue)],
    ) -> Result<()> {
        update_row::<E>(&mut **tx, key, changes).await
    }

    async fn delete_tx(&self, tx: &mut Self::Tx, key: E::Key) -> Result<()> {
        delete_row::<E>(&mut **tx, key).await
    }
}
