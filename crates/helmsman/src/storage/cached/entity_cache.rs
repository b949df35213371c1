//! Typed view of the byte cache for one entity.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use helmsman_core::cache::{
    entity_key, entity_keys, from_bytes, is_placeholder, to_bytes, Cache, Lookup, Result,
    PLACEHOLDER, PLACEHOLDER_TTL,
};
use helmsman_core::storage::{Entity, EntityKey};

/// Stores entities of type `E` under `"<entity>:<key>"` as JSON.
///
/// A key may also hold the not-found placeholder, which lives for
/// [`PLACEHOLDER_TTL`] regardless of the entity TTL.
pub struct EntityCache<E> {
    cache: Arc<dyn Cache>,
    ttl: Duration,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for EntityCache<E> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            ttl: self.ttl,
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> EntityCache<E> {
    pub fn new(cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self {
            cache,
            ttl,
            _entity: PhantomData,
        }
    }

    /// Cache key for an entity key.
    pub fn key(key: E::Key) -> String {
        entity_key(E::NAME, key)
    }

    /// Looks up one entity.
    pub async fn get(&self, key: E::Key) -> Result<Lookup<E>> {
        match self.cache.get(&Self::key(key)).await? {
            None => Ok(Lookup::Miss),
            Some(bytes) if is_placeholder(&bytes) => Ok(Lookup::Placeholder),
            Some(bytes) => from_bytes(&bytes).map(Lookup::Hit),
        }
    }

    /// Caches an entity. Entities with a zero key are ignored.
    pub async fn set(&self, entity: &E) -> Result<()> {
        let key = entity.key();
        if key.is_zero() {
            return Ok(());
        }
        let bytes = to_bytes(entity)?;
        self.cache.set(&Self::key(key), &bytes, Some(self.ttl)).await
    }

    /// Looks up several entities in one round-trip.
    ///
    /// Only real hits are returned. Placeholders, undecodable entries and
    /// misses are all left out.
    pub async fn multi_get(&self, keys: &[E::Key]) -> Result<HashMap<E::Key, E>> {
        let cache_keys = entity_keys(E::NAME, keys);
        let mut raw = self.cache.multi_get(&cache_keys).await?;

        let mut hits = HashMap::with_capacity(raw.len());
        for (key, cache_key) in keys.iter().zip(&cache_keys) {
            let Some(bytes) = raw.remove(cache_key) else {
                continue;
            };
            if is_placeholder(&bytes) {
                continue;
            }
            match from_bytes::<E>(&bytes) {
                Ok(entity) => {
                    hits.insert(*key, entity);
                }
                Err(err) => {
                    tracing::warn!(entity = E::NAME, %key, error = %err, "Cached entity deserialization failed");
                }
            }
        }
        Ok(hits)
    }

    /// Caches several entities in one round-trip. Zero keys are skipped.
    pub async fn multi_set(&self, entities: &[E]) -> Result<()> {
        let mut entries = Vec::with_capacity(entities.len());
        for entity in entities {
            let key = entity.key();
            if key.is_zero() {
                continue;
            }
            entries.push((Self::key(key), to_bytes(entity)?));
        }
        if entries.is_empty() {
            return Ok(());
        }
        self.cache.multi_set(&entries, Some(self.ttl)).await
    }

    /// Removes one key, entity or placeholder alike.
    pub async fn delete(&self, key: E::Key) -> Result<()> {
        self.cache.delete(&Self::key(key)).await
    }

    /// Marks a key as known to be absent from the store.
    pub async fn set_placeholder(&self, key: E::Key) -> Result<()> {
        self.cache
            .set(&Self::key(key), PLACEHOLDER, Some(PLACEHOLDER_TTL))
            .await
    }
}
