//! Account routes that depend on the caller.

use axum::extract::State;
use serde_json::json;

use helmsman_auth::AuthUser;
use helmsman_core::ecode::{self, Operation};
use helmsman_core::journal::Account;
use helmsman_core::storage::Entity;

use crate::models::AccountPayload;
use crate::state::AppState;

use super::extract::JsonBody;
use super::resource::{keyed, success};
use super::{ApiResult, AppError};

/// POST /api/v1/accounts
///
/// The account is always owned by the caller; a `userID` in the body is
/// ignored.
pub async fn create_account(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(payload): JsonBody<AccountPayload>,
) -> ApiResult {
    let mut account: Account = payload.into();
    account.user_id = i64::try_from(user.uid).map_err(|_| {
        tracing::warn!(entity = Account::NAME, uid = user.uid, "Caller id out of range");
        AppError::Business(ecode::ACCOUNTS.code(Operation::Create))
    })?;

    let id = state.accounts.create(&account).await?;
    tracing::debug!(id, uid = user.uid, "Account created for caller");

    Ok(success(keyed("id", json!(id))))
}
