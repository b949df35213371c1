//! Generic cache-aside repository.
//!
//! One `Repository` serves every journal entity. Reads go through the
//! optional cache layer:
//!
//! - **Hit**: the cached entity is returned without touching the store
//! - **Placeholder**: the key is known to be absent, `NotFound` is returned
//! - **Miss**: concurrent lookups of the key share one store query, whose
//!   result (entity or placeholder) is written back to the cache
//!
//! Writes go to the store and then invalidate the touched keys. Cache
//! failures are logged and never fail an operation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use helmsman_core::cache::{Cache, Lookup};
use helmsman_core::query::{build_order, build_page, build_query, Conditions, Page, Params};
use helmsman_core::storage::{
    column_whitelist, sparse_changes, Entity, EntityKey, RepositoryError, Result, Store,
};

use super::coalescer::{Coalescer, Ticket};
use super::entity_cache::EntityCache;

/// Cache state owned by a cached repository.
pub struct CacheLayer<E: Entity> {
    cache: EntityCache<E>,
    flights: Coalescer<Result<E>>,
}

impl<E: Entity> CacheLayer<E> {
    pub fn new(cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self {
            cache: EntityCache::new(cache, ttl),
            flights: Coalescer::new(),
        }
    }
}

/// Repository for entity `E` backed by store `S`.
pub struct Repository<E: Entity, S: Store<E>> {
    store: Arc<S>,
    cache: Option<CacheLayer<E>>,
}

impl<E: Entity, S: Store<E>> Repository<E, S> {
    /// Creates a repository that always reads from the store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store, cache: None }
    }

    /// Creates a repository with a cache layer.
    ///
    /// `ttl` applies to cached entities; placeholders keep their own TTL.
    pub fn with_cache(store: Arc<S>, cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self {
            store,
            cache: Some(CacheLayer::new(cache, ttl)),
        }
    }

    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    /// Inserts an entity and returns its key.
    ///
    /// Any placeholder left by an earlier lookup of the key is removed.
    pub async fn create(&self, entity: &E) -> Result<E::Key> {
        if !E::GENERATED_KEY {
            check_key::<E>(entity.key())?;
        }

        let key = self.store.insert(entity).await?;
        self.invalidate(key).await;

        tracing::debug!(entity = E::NAME, %key, "Entity created");
        Ok(key)
    }

    /// Gets an entity by key.
    pub async fn get(&self, key: E::Key) -> Result<E> {
        check_key::<E>(key)?;

        let Some(layer) = &self.cache else {
            return self
                .store
                .find(key)
                .await?
                .ok_or_else(|| RepositoryError::not_found(E::NAME, key));
        };

        match layer.cache.get(key).await {
            Ok(Lookup::Hit(entity)) => {
                tracing::trace!(entity = E::NAME, %key, "Cache hit");
                return Ok(entity);
            }
            Ok(Lookup::Placeholder) => {
                tracing::trace!(entity = E::NAME, %key, "Cache placeholder hit");
                return Err(RepositoryError::not_found(E::NAME, key));
            }
            Ok(Lookup::Miss) => {}
            Err(err) => {
                tracing::warn!(entity = E::NAME, %key, error = %err, "Cache read failed");
            }
        }

        tracing::trace!(entity = E::NAME, %key, "Cache miss");
        let store = self.store.clone();
        let cache = layer.cache.clone();
        let fetch = move |ticket: Ticket| async move {
            let found = store.find(key).await?;
            // A write that lands during the fetch forgets the flight; its
            // result is then returned to the waiters but never cached.
            if ticket.is_current() {
                let written = match &found {
                    Some(entity) => cache.set(entity).await,
                    None => cache.set_placeholder(key).await,
                };
                if let Err(err) = written {
                    tracing::warn!(entity = E::NAME, %key, error = %err, "Failed to cache lookup");
                }
                if !ticket.is_current() {
                    if let Err(err) = cache.delete(key).await {
                        tracing::warn!(entity = E::NAME, %key, error = %err, "Failed to drop stale cache entry");
                    }
                }
            } else {
                tracing::debug!(entity = E::NAME, %key, "Key written during lookup, not caching");
            }
            found.ok_or_else(|| RepositoryError::not_found(E::NAME, key))
        };

        layer
            .flights
            .run(&key.to_string(), fetch)
            .await
            .unwrap_or_else(|aborted| Err(RepositoryError::QueryFailed(aborted.to_string())))
    }

    /// Gets several entities by key.
    ///
    /// Keys that do not exist are absent from the result. The store is
    /// queried once, for the keys that are neither cached nor known to be
    /// absent.
    pub async fn get_many(&self, keys: &[E::Key]) -> Result<HashMap<E::Key, E>> {
        for key in keys {
            check_key::<E>(*key)?;
        }
        let mut seen = HashSet::with_capacity(keys.len());
        let keys: Vec<E::Key> = keys.iter().copied().filter(|k| seen.insert(*k)).collect();
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let Some(layer) = &self.cache else {
            let rows = self.store.find_many(&keys).await?;
            return Ok(rows.into_iter().map(|e| (e.key(), e)).collect());
        };

        let mut found = match layer.cache.multi_get(&keys).await {
            Ok(hits) => hits,
            Err(err) => {
                tracing::warn!(entity = E::NAME, error = %err, "Cache multi-get failed");
                HashMap::new()
            }
        };

        let mut misses = Vec::new();
        let unresolved: Vec<E::Key> = keys
            .iter()
            .copied()
            .filter(|k| !found.contains_key(k))
            .collect();
        for key in unresolved {
            match layer.cache.get(key).await {
                Ok(Lookup::Placeholder) => {}
                Ok(Lookup::Hit(entity)) => {
                    found.insert(key, entity);
                }
                Ok(Lookup::Miss) | Err(_) => misses.push(key),
            }
        }
        tracing::trace!(
            entity = E::NAME,
            requested = keys.len(),
            cached = found.len(),
            missed = misses.len(),
            "Cache multi-get"
        );
        if misses.is_empty() {
            return Ok(found);
        }

        let rows = self.store.find_many(&misses).await?;
        if let Err(err) = layer.cache.multi_set(&rows).await {
            tracing::warn!(entity = E::NAME, error = %err, "Failed to cache entities");
        }
        found.extend(rows.into_iter().map(|e| (e.key(), e)));

        for key in misses.into_iter().filter(|k| !found.contains_key(k)) {
            if let Err(err) = layer.cache.set_placeholder(key).await {
                tracing::warn!(entity = E::NAME, %key, error = %err, "Failed to cache placeholder");
            }
        }

        Ok(found)
    }

    /// Applies the non-zero fields of `entity` to the stored row with the
    /// same key.
    ///
    /// The key's cache entry is removed whether or not the update succeeds.
    pub async fn update(&self, entity: &E) -> Result<()> {
        let key = entity.key();
        check_key::<E>(key)?;

        let result = self.store.update(key, &sparse_changes(entity)).await;
        self.invalidate(key).await;
        result?;

        tracing::debug!(entity = E::NAME, %key, "Entity updated");
        Ok(())
    }

    /// Deletes an entity by key.
    pub async fn delete(&self, key: E::Key) -> Result<()> {
        check_key::<E>(key)?;

        self.store.delete(key).await?;
        self.invalidate(key).await;

        tracing::debug!(entity = E::NAME, %key, "Entity deleted");
        Ok(())
    }

    /// Deletes every entity whose key is in `keys`. Missing keys are ignored.
    pub async fn delete_many(&self, keys: &[E::Key]) -> Result<()> {
        for key in keys {
            check_key::<E>(*key)?;
        }

        self.store.delete_many(keys).await?;
        for key in keys {
            self.invalidate(*key).await;
        }

        tracing::debug!(entity = E::NAME, count = keys.len(), "Entities deleted");
        Ok(())
    }

    /// Gets the first entity matching a set of conditions.
    pub async fn find_one(&self, conditions: &Conditions) -> Result<E> {
        if conditions.columns.is_empty() {
            return Err(RepositoryError::InvalidArgument(
                "at least one condition is required".to_string(),
            ));
        }
        let filter = build_query(&conditions.columns, &column_whitelist::<E>())?;

        self.store
            .find_first(&filter)
            .await?
            .ok_or_else(|| RepositoryError::not_found(E::NAME, "condition"))
    }

    /// Lists one page of entities and the total number of matches.
    ///
    /// The total is `0` when the sort asks to skip counting.
    pub async fn list(&self, params: &Params) -> Result<(Vec<E>, u64)> {
        let whitelist = column_whitelist::<E>();
        let filter = build_query(&params.columns, &whitelist)?;
        let page = build_page(params, &whitelist)?;

        let total = if params.skips_count() {
            0
        } else {
            let total = self.store.count(&filter).await?;
            if total == 0 {
                return Ok((Vec::new(), 0));
            }
            total
        };

        let rows = self.store.find_page(&filter, &page).await?;
        Ok((rows, total))
    }

    /// Lists every entity matching a set of conditions, newest key first.
    pub async fn list_all(&self, conditions: &Conditions) -> Result<Vec<E>> {
        let filter = build_query(&conditions.columns, &column_whitelist::<E>())?;
        let page = Page {
            order: format!("{} DESC", E::KEY_COLUMN),
            limit: None,
            offset: 0,
        };
        self.store.find_page(&filter, &page).await
    }

    /// Lists entities with a key below `last_key`.
    ///
    /// A zero `last_key` starts from the top. `limit` follows the list
    /// defaults and cap.
    pub async fn list_before(&self, last_key: E::Key, limit: u32, sort: &str) -> Result<Vec<E>> {
        let whitelist = column_whitelist::<E>();
        let params = Params {
            limit,
            ..Default::default()
        };
        let page = Page {
            order: build_order(sort, &whitelist)?,
            ..build_page(&params, &whitelist)?
        };
        let last_key = if last_key.is_zero() {
            None
        } else {
            check_key::<E>(last_key)?;
            Some(last_key)
        };

        self.store.find_before(last_key, &page).await
    }

    /// Starts a transaction.
    pub async fn begin(&self) -> Result<S::Tx> {
        self.store.begin().await
    }

    pub async fn commit(&self, tx: S::Tx) -> Result<()> {
        self.store.commit(tx).await
    }

    pub async fn rollback(&self, tx: S::Tx) -> Result<()> {
        self.store.rollback(tx).await
    }

    /// Inserts an entity inside a transaction.
    pub async fn create_tx(&self, tx: &mut S::Tx, entity: &E) -> Result<E::Key> {
        if !E::GENERATED_KEY {
            check_key::<E>(entity.key())?;
        }

        let key = self.store.insert_tx(tx, entity).await?;
        self.invalidate(key).await;
        Ok(key)
    }

    /// Applies a partial update inside a transaction.
    pub async fn update_tx(&self, tx: &mut S::Tx, entity: &E) -> Result<()> {
        let key = entity.key();
        check_key::<E>(key)?;

        let result = self.store.update_tx(tx, key, &sparse_changes(entity)).await;
        self.invalidate(key).await;
        result
    }

    /// Deletes an entity inside a transaction.
    pub async fn delete_tx(&self, tx: &mut S::Tx, key: E::Key) -> Result<()> {
        check_key::<E>(key)?;

        self.store.delete_tx(tx, key).await?;
        self.invalidate(key).await;
        Ok(())
    }

    /// Drops the cached value of `key` and detaches any lookup of it still
    /// in flight, so the next read sees the store as of now.
    async fn invalidate(&self, key: E::Key) {
        if let Some(layer) = &self.cache {
            layer.flights.forget(&key.to_string());
            if let Err(err) = layer.cache.delete(key).await {
                tracing::warn!(entity = E::NAME, %key, error = %err, "Failed to invalidate cache");
            }
        }
    }
}

/// Rejects the zero key and keys outside the store's range.
fn check_key<E: Entity>(key: E::Key) -> Result<()> {
    if key.is_zero() {
        return Err(RepositoryError::InvalidArgument(format!(
            "{} key cannot be 0",
            E::NAME
        )));
    }
    if !key.fits_store() {
        return Err(RepositoryError::InvalidArgument(format!(
            "{} key {key} is out of range",
            E::NAME
        )));
    }
    Ok(())
}
