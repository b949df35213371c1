use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A journal owner who can log in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub username: String,
    /// bcrypt hash of the user's password.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A brokerage or prop account trades are booked against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: u64,
    #[serde(rename = "userID")]
    pub user_id: i64,
    pub name: String,
    pub initial_balance: f64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named trading playbook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub id: u64,
    #[serde(rename = "userID")]
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single trade, from plan to review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: u64,
    #[serde(rename = "accountID")]
    pub account_id: i64,
    #[serde(rename = "strategyID")]
    pub strategy_id: i64,
    pub status: String,
    pub symbol: String,
    pub direction: String,

    // Plan
    pub planned_entry_price: f64,
    pub planned_stop_loss: f64,
    pub planned_take_profit: f64,
    pub position_size: f64,
    pub planned_risk_amount: f64,
    pub plan_notes: String,

    // Execution
    pub actual_entry_time: String,
    pub actual_entry_price: f64,
    pub actual_exit_time: String,
    pub actual_exit_price: f64,
    pub commission: f64,
    pub pnl: f64,
    pub r_multiple: f64,

    // Review
    pub exit_reason: String,
    pub execution_score: i64,
    pub reflection_notes: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user-defined label for trades.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: u64,
    #[serde(rename = "userID")]
    pub user_id: i64,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Links a trade to a tag. Keyed by the trade.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeTag {
    #[serde(rename = "tradeID")]
    pub trade_id: u64,
    #[serde(rename = "tagID")]
    pub tag_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A chart screenshot attached to a trade.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: u64,
    #[serde(rename = "tradeID")]
    pub trade_id: i64,
    /// When the screenshot was taken, e.g. "entry" or "exit".
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
