//! SQLite row conversion functions.
//!
//! Converts `SqliteRow`s into journal entities. Rows are read by column
//! name; the select list always comes from the entity's column whitelist.

use chrono::{DateTime, Utc};
use helmsman_core::journal::{Account, Snapshot, Strategy, Tag, Trade, TradeTag, User};
use helmsman_core::storage::Entity;
use sqlx::{sqlite::SqliteRow, Row};

/// An entity stored in its own SQLite table.
pub trait SqlEntity: Entity {
    /// Table name.
    const TABLE: &'static str;

    /// Whether deletes set the `deleted_at` tombstone instead of removing the row.
    const SOFT_DELETE: bool = false;

    /// Decodes one row selected with the entity's column whitelist.
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error>;
}

/// Formats a timestamp for storage.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn get_key(row: &SqliteRow, column: &str) -> Result<u64, sqlx::Error> {
    let value: i64 = row.try_get(column)?;
    u64::try_from(value).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn get_timestamps(row: &SqliteRow) -> Result<(DateTime<Utc>, DateTime<Utc>), sqlx::Error> {
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;
    Ok((parse_datetime(&created_at)?, parse_datetime(&updated_at)?))
}

impl SqlEntity for User {
    const TABLE: &'static str = "users";
    const SOFT_DELETE: bool = true;

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let (created_at, updated_at) = get_timestamps(row)?;
        Ok(User {
            id: get_key(row, "id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            created_at,
            updated_at,
        })
    }
}

impl SqlEntity for Account {
    const TABLE: &'static str = "accounts";

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let (created_at, updated_at) = get_timestamps(row)?;
        Ok(Account {
            id: get_key(row, "id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            initial_balance: row.try_get("initial_balance")?,
            currency: row.try_get("currency")?,
            created_at,
            updated_at,
        })
    }
}

impl SqlEntity for Strategy {
    const TABLE: &'static str = "strategies";

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let (created_at, updated_at) = get_timestamps(row)?;
        Ok(Strategy {
            id: get_key(row, "id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            created_at,
            updated_at,
        })
    }
}

impl SqlEntity for Trade {
    const TABLE: &'static str = "trades";

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let (created_at, updated_at) = get_timestamps(row)?;
        Ok(Trade {
            id: get_key(row, "id")?,
            account_id: row.try_get("account_id")?,
            strategy_id: row.try_get("strategy_id")?,
            status: row.try_get("status")?,
            symbol: row.try_get("symbol")?,
            direction: row.try_get("direction")?,
            planned_entry_price: row.try_get("planned_entry_price")?,
            planned_stop_loss: row.try_get("planned_stop_loss")?,
            planned_take_profit: row.try_get("planned_take_profit")?,
            position_size: row.try_get("position_size")?,
            planned_risk_amount: row.try_get("planned_risk_amount")?,
            plan_notes: row.try_get("plan_notes")?,
            actual_entry_time: row.try_get("actual_entry_time")?,
            actual_entry_price: row.try_get("actual_entry_price")?,
            actual_exit_time: row.try_get("actual_exit_time")?,
            actual_exit_price: row.try_get("actual_exit_price")?,
            commission: row.try_get("commission")?,
            pnl: row.try_get("pnl")?,
            r_multiple: row.try_get("r_multiple")?,
            exit_reason: row.try_get("exit_reason")?,
            execution_score: row.try_get("execution_score")?,
            reflection_notes: row.try_get("reflection_notes")?,
            created_at,
            updated_at,
        })
    }
}

impl SqlEntity for Tag {
    const TABLE: &'static str = "tags";

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let (created_at, updated_at) = get_timestamps(row)?;
        Ok(Tag {
            id: get_key(row, "id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            color: row.try_get("color")?,
            created_at,
            updated_at,
        })
    }
}

impl SqlEntity for TradeTag {
    const TABLE: &'static str = "trade_tags";

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let (created_at, updated_at) = get_timestamps(row)?;
        Ok(TradeTag {
            trade_id: get_key(row, "trade_id")?,
            tag_id: row.try_get("tag_id")?,
            created_at,
            updated_at,
        })
    }
}

impl SqlEntity for Snapshot {
    const TABLE: &'static str = "snapshots";

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let (created_at, updated_at) = get_timestamps(row)?;
        Ok(Snapshot {
            id: get_key(row, "id")?,
            trade_id: row.try_get("trade_id")?,
            kind: row.try_get("type")?,
            image_url: row.try_get("image_url")?,
            created_at,
            updated_at,
        })
    }
}
