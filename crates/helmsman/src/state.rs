//! Shared application state.
//!
//! Holds one repository per journal entity. All repositories share the
//! SQLite pool and, when enabled, the cache backend selected by feature flag.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use helmsman_auth::AuthConfig;
use helmsman_core::cache::Cache;
use helmsman_core::journal::{Account, Snapshot, Strategy, Tag, Trade, TradeTag, User};

use crate::config::Config;
use crate::storage::sqlite::SqlEntity;
use crate::storage::{connect, Repo, Repository, SqliteStore};

/// Shared application state.
///
/// Cloned for each request handler.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<Repo<User>>,
    pub accounts: Arc<Repo<Account>>,
    pub strategies: Arc<Repo<Strategy>>,
    pub trades: Arc<Repo<Trade>>,
    pub tags: Arc<Repo<Tag>>,
    pub trade_tags: Arc<Repo<TradeTag>>,
    pub snapshots: Arc<Repo<Snapshot>>,
    pub auth: Arc<AuthConfig>,
}

impl FromRef<AppState> for Arc<AuthConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl AppState {
    /// Opens the database and the configured cache backend.
    pub async fn new(config: &Config, auth: AuthConfig) -> anyhow::Result<Self> {
        let pool = connect(&config.sqlite_path).await?;

        let cache = if config.cache_enabled {
            Some(open_cache(config).await?)
        } else {
            tracing::info!("Cache disabled, reads go straight to SQLite");
            None
        };

        let state = Self::build(pool, cache, config.cache_ttl(), Arc::new(auth));
        tracing::info!(
            sqlite_path = %config.sqlite_path,
            cached = state.users.is_cached(),
            "Repositories ready"
        );
        Ok(state)
    }

    /// Builds the repositories over an existing pool.
    pub fn build(
        pool: SqlitePool,
        cache: Option<Arc<dyn Cache>>,
        ttl: Duration,
        auth: Arc<AuthConfig>,
    ) -> Self {
        Self {
            users: repository(&pool, &cache, ttl),
            accounts: repository(&pool, &cache, ttl),
            strategies: repository(&pool, &cache, ttl),
            trades: repository(&pool, &cache, ttl),
            tags: repository(&pool, &cache, ttl),
            trade_tags: repository(&pool, &cache, ttl),
            snapshots: repository(&pool, &cache, ttl),
            auth,
        }
    }
}

fn repository<E: SqlEntity>(
    pool: &SqlitePool,
    cache: &Option<Arc<dyn Cache>>,
    ttl: Duration,
) -> Arc<Repo<E>> {
    let store = Arc::new(SqliteStore::new(pool.clone()));
    Arc::new(match cache {
        Some(cache) => Repository::with_cache(store, cache.clone(), ttl),
        None => Repository::new(store),
    })
}

#[cfg(feature = "memory")]
async fn open_cache(config: &Config) -> anyhow::Result<Arc<dyn Cache>> {
    use crate::cache::MemoryCache;

    tracing::info!(max_entries = config.cache_max_entries, "Using in-memory cache");
    Ok(Arc::new(MemoryCache::new(config.cache_max_entries)))
}

#[cfg(feature = "redis")]
async fn open_cache(config: &Config) -> anyhow::Result<Arc<dyn Cache>> {
    use crate::cache::RedisCache;

    tracing::info!(url = %config.redis_url, "Using Redis cache");
    Ok(Arc::new(RedisCache::new(&config.redis_url).await?))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// State over a fresh in-memory database.
    pub(crate) async fn test_state(cached: bool) -> AppState {
        let config = Config {
            cache_enabled: cached,
            cache_ttl_seconds: 300,
            cache_max_entries: 1_000,
            sqlite_path: ":memory:".to_string(),
            redis_url: "redis://localhost:6379".to_string(),
            request_timeout_seconds: 10,
        };
        let pool = connect(&config.sqlite_path).await.unwrap();
        let cache: Option<Arc<dyn Cache>> = cached.then(|| -> Arc<dyn Cache> {
            Arc::new(crate::cache::MemoryCache::new(config.cache_max_entries))
        });
        let auth = AuthConfig {
            bcrypt_cost: 4,
            ..AuthConfig::new("test-secret")
        };

        AppState::build(pool, cache, config.cache_ttl(), Arc::new(auth))
    }

    #[tokio::test]
    async fn test_repositories_follow_cache_flag() {
        assert!(test_state(true).await.trades.is_cached());
        assert!(!test_state(false).await.trades.is_cached());
    }
}
