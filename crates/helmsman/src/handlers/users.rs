//! User extras: login, register and the batch/condition/cursor queries.

use axum::extract::State;
use serde_json::{json, Value};

use helmsman_auth::{hash_password, issue_token, verify_password};
use helmsman_core::ecode::{
    Operation, INVALID_PARAMS, USERNAME_ALREADY_EXISTS, USERNAME_OR_PASSWORD_NOT_FOUND,
};
use helmsman_core::journal::User;
use helmsman_core::query::{Column, Conditions};
use helmsman_core::storage::{Entity, RepositoryError};

use crate::models::{Credentials, IdsRequest, LastIdQuery};
use crate::state::AppState;

use super::extract::{JsonBody, QueryParams};
use super::resource::{keyed, success, to_data};
use super::{ApiResult, AppError};

fn username_is(username: &str) -> Conditions {
    Conditions {
        columns: vec![Column {
            name: "username".to_string(),
            exp: "=".to_string(),
            value: json!(username),
            logic: String::new(),
        }],
    }
}

/// Looks a live user up by username.
async fn find_by_username(state: &AppState, username: &str) -> Result<Option<User>, AppError> {
    match state.users.find_one(&username_is(username)).await {
        Ok(user) => Ok(Some(user)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// POST /api/v1/users/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> ApiResult {
    if credentials.is_blank() {
        return Err(INVALID_PARAMS.into());
    }

    let Some(user) = find_by_username(&state, &credentials.username).await? else {
        tracing::warn!(username = %credentials.username, "Login for unknown username");
        return Err(USERNAME_OR_PASSWORD_NOT_FOUND.into());
    };

    if !verify_password(credentials.password, user.password_hash.clone()).await? {
        tracing::warn!(uid = user.id, "Login with wrong password");
        return Err(USERNAME_OR_PASSWORD_NOT_FOUND.into());
    }

    let token = issue_token(&state.auth, user.id)?;
    tracing::info!(uid = user.id, "User logged in");

    Ok(success(json!({
        "id": user.id,
        "username": user.username,
        "token": token,
    })))
}

/// POST /api/v1/users/register
pub async fn register(
    State(state): State<AppState>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> ApiResult {
    if credentials.is_blank() {
        return Err(INVALID_PARAMS.into());
    }

    if find_by_username(&state, &credentials.username).await?.is_some() {
        tracing::warn!(username = %credentials.username, "Username already exists");
        return Err(USERNAME_ALREADY_EXISTS.into());
    }

    let user = User {
        username: credentials.username,
        password_hash: hash_password(credentials.password, state.auth.bcrypt_cost).await?,
        ..Default::default()
    };

    let id = match state.users.create(&user).await {
        Ok(id) => id,
        // Lost a race with a concurrent registration
        Err(RepositoryError::AlreadyExists { .. }) => {
            return Err(USERNAME_ALREADY_EXISTS.into());
        }
        Err(err) => return Err(err.into()),
    };
    tracing::info!(uid = id, "User registered");

    Ok(success(json!({ "id": id })))
}

/// POST /api/v1/users/condition
pub async fn get_by_condition(
    State(state): State<AppState>,
    JsonBody(conditions): JsonBody<Conditions>,
) -> ApiResult {
    let user = state.users.find_one(&conditions).await?;
    let data = to_data::<User, _>(&user, Operation::GetByCondition)?;

    Ok(success(keyed(User::NAME, data)))
}

/// POST /api/v1/users/delete/ids
pub async fn delete_by_ids(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<IdsRequest>,
) -> ApiResult {
    if request.ids.is_empty() {
        return Err(INVALID_PARAMS.into());
    }

    state.users.delete_many(&request.ids).await?;
    Ok(success(json!({})))
}

/// POST /api/v1/users/list/ids
///
/// Users come back in request order. Missing keys are skipped.
pub async fn list_by_ids(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<IdsRequest>,
) -> ApiResult {
    if request.ids.is_empty() {
        return Err(INVALID_PARAMS.into());
    }

    let mut found = state.users.get_many(&request.ids).await?;
    let users: Vec<User> = request
        .ids
        .iter()
        .filter_map(|id| found.remove(id))
        .collect();
    let data = to_data::<User, _>(&users, Operation::ListByIds)?;

    Ok(success(keyed(User::NAME, data)))
}

/// GET /api/v1/users/list?lastID=&limit=&sort=
pub async fn list_by_last_id(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<LastIdQuery>,
) -> ApiResult {
    let users = state
        .users
        .list_before(query.last_id, query.limit, &query.sort)
        .await?;
    let data: Value = to_data::<User, _>(&users, Operation::ListByLastId)?;

    Ok(success(keyed(User::NAME, data)))
}
