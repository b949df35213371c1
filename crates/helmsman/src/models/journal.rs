//! Request bodies for the journal CRUD routes.
//!
//! One payload per entity serves both create and update. Omitted fields
//! default to their zero value, which the partial update skips.

use serde::Deserialize;

use helmsman_core::journal::{Account, Snapshot, Strategy, Tag, Trade, TradeTag, User};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserPayload {
    pub username: String,
    pub password_hash: String,
}

impl From<UserPayload> for User {
    fn from(payload: UserPayload) -> Self {
        User {
            username: payload.username,
            password_hash: payload.password_hash,
            ..Default::default()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccountPayload {
    #[serde(rename = "userID")]
    pub user_id: i64,
    pub name: String,
    pub initial_balance: f64,
    pub currency: String,
}

impl From<AccountPayload> for Account {
    fn from(payload: AccountPayload) -> Self {
        Account {
            user_id: payload.user_id,
            name: payload.name,
            initial_balance: payload.initial_balance,
            currency: payload.currency,
            ..Default::default()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StrategyPayload {
    #[serde(rename = "userID")]
    pub user_id: i64,
    pub name: String,
    pub description: String,
}

impl From<StrategyPayload> for Strategy {
    fn from(payload: StrategyPayload) -> Self {
        Strategy {
            user_id: payload.user_id,
            name: payload.name,
            description: payload.description,
            ..Default::default()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TradePayload {
    #[serde(rename = "accountID")]
    pub account_id: i64,
    #[serde(rename = "strategyID")]
    pub strategy_id: i64,
    pub status: String,
    pub symbol: String,
    pub direction: String,
    pub planned_entry_price: f64,
    pub planned_stop_loss: f64,
    pub planned_take_profit: f64,
    pub position_size: f64,
    pub planned_risk_amount: f64,
    pub plan_notes: String,
    pub actual_entry_time: String,
    pub actual_entry_price: f64,
    pub actual_exit_time: String,
    pub actual_exit_price: f64,
    pub commission: f64,
    pub pnl: f64,
    pub r_multiple: f64,
    pub exit_reason: String,
    pub execution_score: i64,
    pub reflection_notes: String,
}

impl From<TradePayload> for Trade {
    fn from(p: TradePayload) -> Self {
        Trade {
            account_id: p.account_id,
            strategy_id: p.strategy_id,
            status: p.status,
            symbol: p.symbol,
            direction: p.direction,
            planned_entry_price: p.planned_entry_price,
            planned_stop_loss: p.planned_stop_loss,
            planned_take_profit: p.planned_take_profit,
            position_size: p.position_size,
            planned_risk_amount: p.planned_risk_amount,
            plan_notes: p.plan_notes,
            actual_entry_time: p.actual_entry_time,
            actual_entry_price: p.actual_entry_price,
            actual_exit_time: p.actual_exit_time,
            actual_exit_price: p.actual_exit_price,
            commission: p.commission,
            pnl: p.pnl,
            r_multiple: p.r_multiple,
            exit_reason: p.exit_reason,
            execution_score: p.execution_score,
            reflection_notes: p.reflection_notes,
            ..Default::default()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TagPayload {
    #[serde(rename = "userID")]
    pub user_id: i64,
    pub name: String,
    pub color: String,
}

impl From<TagPayload> for Tag {
    fn from(payload: TagPayload) -> Self {
        Tag {
            user_id: payload.user_id,
            name: payload.name,
            color: payload.color,
            ..Default::default()
        }
    }
}

/// The trade key is taken from the body on create and from the path on update.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TradeTagPayload {
    #[serde(rename = "tradeID")]
    pub trade_id: u64,
    #[serde(rename = "tagID")]
    pub tag_id: i64,
}

impl From<TradeTagPayload> for TradeTag {
    fn from(payload: TradeTagPayload) -> Self {
        TradeTag {
            trade_id: payload.trade_id,
            tag_id: payload.tag_id,
            ..Default::default()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SnapshotPayload {
    #[serde(rename = "tradeID")]
    pub trade_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
}

impl From<SnapshotPayload> for Snapshot {
    fn from(payload: SnapshotPayload) -> Self {
        Snapshot {
            trade_id: payload.trade_id,
            kind: payload.kind,
            image_url: payload.image_url,
            ..Default::default()
        }
    }
}
