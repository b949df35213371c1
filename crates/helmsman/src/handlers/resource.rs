//! Generic CRUD handlers shared by every journal entity.
//!
//! Each entity implements [`Resource`] and gets the five standard routes
//! from [`routes`] ([`keyed_routes`] leaves out create):
//!
//! - `POST /` create
//! - `DELETE /{id}` delete
//! - `PUT /{id}` partial update
//! - `GET /{id}` get
//! - `POST /list` filtered, paginated list

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Map, Value};

use helmsman_core::ecode::{self, BusinessCodes, Operation, Reply};
use helmsman_core::journal::{Account, Snapshot, Strategy, Tag, Trade, TradeTag, User};
use helmsman_core::query::Params;
use helmsman_core::storage::Entity;

use crate::models::{
    AccountPayload, SnapshotPayload, StrategyPayload, TagPayload, TradePayload, TradeTagPayload,
    UserPayload,
};
use crate::state::AppState;
use crate::storage::sqlite::SqlEntity;
use crate::storage::Repo;

use super::extract::{JsonBody, PathParams};
use super::{ApiResult, AppError};

/// An entity served over HTTP.
pub trait Resource: SqlEntity<Key = u64> {
    /// Business error codes of the entity.
    const CODES: BusinessCodes;

    /// Data key of list responses.
    const LIST_KEY: &'static str;

    /// Data key of create responses.
    const CREATED_KEY: &'static str = "id";

    /// Create and update body.
    type Payload: DeserializeOwned + Into<Self> + Send + 'static;

    fn repo(state: &AppState) -> &Arc<Repo<Self>>;
}

/// Builds the standard routes for `R`, to be nested under `/api/v1/<entity>`.
pub fn routes<R: Resource>() -> Router<AppState> {
    Router::new()
        .route("/", post(create::<R>))
        .merge(keyed_routes::<R>())
}

/// The standard routes for `R` without create, for entities whose create
/// needs more than the request body.
pub fn keyed_routes<R: Resource>() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(get_by_key::<R>)
                .put(update::<R>)
                .delete(delete::<R>),
        )
        .route("/list", post(list::<R>))
}

/// Wraps `value` as `{key: value}`.
pub fn keyed(key: &str, value: Value) -> Value {
    let mut data = Map::with_capacity(1);
    data.insert(key.to_string(), value);
    Value::Object(data)
}

/// Serializes a response value, reporting failures with the operation's code.
pub fn to_data<R: Resource, T: Serialize>(value: &T, op: Operation) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(|err| {
        tracing::error!(entity = R::NAME, error = %err, "Response serialization failed");
        AppError::Business(R::CODES.code(op))
    })
}

pub fn success(data: Value) -> Json<Reply<Value>> {
    Json(Reply::success(data))
}

pub async fn create<R: Resource>(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<R::Payload>,
) -> ApiResult {
    let entity: R = payload.into();
    let key = R::repo(&state).create(&entity).await?;

    Ok(success(keyed(R::CREATED_KEY, json!(key))))
}

pub async fn delete<R: Resource>(
    State(state): State<AppState>,
    PathParams(key): PathParams<u64>,
) -> ApiResult {
    R::repo(&state).delete(key).await?;
    Ok(success(json!({})))
}

pub async fn update<R: Resource>(
    State(state): State<AppState>,
    PathParams(key): PathParams<u64>,
    JsonBody(payload): JsonBody<R::Payload>,
) -> ApiResult {
    let mut entity: R = payload.into();
    entity.set_key(key);
    R::repo(&state).update(&entity).await?;

    Ok(success(json!({})))
}

pub async fn get_by_key<R: Resource>(
    State(state): State<AppState>,
    PathParams(key): PathParams<u64>,
) -> ApiResult {
    let entity = R::repo(&state).get(key).await?;
    let data = to_data::<R, _>(&entity, Operation::GetById)?;

    Ok(success(keyed(R::NAME, data)))
}

pub async fn list<R: Resource>(
    State(state): State<AppState>,
    JsonBody(params): JsonBody<Params>,
) -> ApiResult {
    let (rows, total) = R::repo(&state).list(&params).await?;

    let mut data = Map::with_capacity(2);
    data.insert(R::LIST_KEY.to_string(), to_data::<R, _>(&rows, Operation::List)?);
    data.insert("total".to_string(), json!(total));
    Ok(success(Value::Object(data)))
}

impl Resource for User {
    const CODES: BusinessCodes = ecode::USERS;
    const LIST_KEY: &'static str = "userss";
    type Payload = UserPayload;

    fn repo(state: &AppState) -> &Arc<Repo<Self>> {
        &state.users
    }
}

impl Resource for Account {
    const CODES: BusinessCodes = ecode::ACCOUNTS;
    const LIST_KEY: &'static str = "accountss";
    type Payload = AccountPayload;

    fn repo(state: &AppState) -> &Arc<Repo<Self>> {
        &state.accounts
    }
}

impl Resource for Strategy {
    const CODES: BusinessCodes = ecode::STRATEGIES;
    const LIST_KEY: &'static str = "strategiess";
    type Payload = StrategyPayload;

    fn repo(state: &AppState) -> &Arc<Repo<Self>> {
        &state.strategies
    }
}

impl Resource for Trade {
    const CODES: BusinessCodes = ecode::TRADES;
    const LIST_KEY: &'static str = "tradess";
    type Payload = TradePayload;

    fn repo(state: &AppState) -> &Arc<Repo<Self>> {
        &state.trades
    }
}

impl Resource for Tag {
    const CODES: BusinessCodes = ecode::TAGS;
    const LIST_KEY: &'static str = "tagss";
    type Payload = TagPayload;

    fn repo(state: &AppState) -> &Arc<Repo<Self>> {
        &state.tags
    }
}

impl Resource for TradeTag {
    const CODES: BusinessCodes = ecode::TRADE_TAGS;
    const LIST_KEY: &'static str = "tradeTags";
    const CREATED_KEY: &'static str = "tradeID";
    type Payload = TradeTagPayload;

    fn repo(state: &AppState) -> &Arc<Repo<Self>> {
        &state.trade_tags
    }
}

impl Resource for Snapshot {
    const CODES: BusinessCodes = ecode::SNAPSHOTS;
    const LIST_KEY: &'static str = "snapshotss";
    type Payload = SnapshotPayload;

    fn repo(state: &AppState) -> &Arc<Repo<Self>> {
        &state.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyed() {
        assert_eq!(keyed("trades", json!({"id": 1})), json!({"trades": {"id": 1}}));
    }

    #[test]
    fn test_list_keys_follow_wire_format() {
        assert_eq!(Trade::LIST_KEY, "tradess");
        assert_eq!(TradeTag::LIST_KEY, "tradeTags");
        assert_eq!(TradeTag::CREATED_KEY, "tradeID");
        assert_eq!(Snapshot::CREATED_KEY, "id");
    }

    #[test]
    fn test_codes_match_entity_names() {
        assert_eq!(Trade::CODES.name, Trade::NAME);
        assert_eq!(TradeTag::CODES.name, TradeTag::NAME);
        assert_eq!(User::CODES.name, User::NAME);
    }
}
