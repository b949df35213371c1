//! Unpaginated collection queries.

use axum::extract::State;
use serde_json::json;

use helmsman_auth::AuthUser;
use helmsman_core::ecode::Operation;
use helmsman_core::journal::{Tag, TradeTag};
use helmsman_core::query::{Column, Conditions};
use helmsman_core::storage::Entity;

use crate::state::AppState;

use super::extract::JsonBody;
use super::resource::{keyed, success, to_data};
use super::ApiResult;

/// GET /api/v1/tags/list/all
///
/// Every tag owned by the caller, newest first.
pub async fn list_user_tags(State(state): State<AppState>, user: AuthUser) -> ApiResult {
    let conditions = Conditions {
        columns: vec![Column {
            name: "user_id".to_string(),
            exp: "=".to_string(),
            value: json!(user.uid),
            logic: String::new(),
        }],
    };
    let tags = state.tags.list_all(&conditions).await?;
    let data = to_data::<Tag, _>(&tags, Operation::List)?;

    Ok(success(keyed(Tag::NAME, data)))
}

/// POST /api/v1/tradeTags/all
///
/// Every trade tag matching the conditions.
pub async fn list_trade_tags(
    State(state): State<AppState>,
    JsonBody(conditions): JsonBody<Conditions>,
) -> ApiResult {
    let trade_tags = state.trade_tags.list_all(&conditions).await?;
    let data = to_data::<TradeTag, _>(&trade_tags, Operation::List)?;

    Ok(success(keyed(TradeTag::NAME, data)))
}
