//! Column-mapping tables for the journal entities.

use crate::storage::{ColumnMapping, Entity, SqlValue};

use super::{Account, Snapshot, Strategy, Tag, Trade, TradeTag, User};

fn text(value: &str) -> SqlValue {
    SqlValue::Text(value.to_string())
}

static USER_COLUMNS: &[ColumnMapping<User>] = &[
    ColumnMapping::new("username", "username", |u: &User| text(&u.username)),
    ColumnMapping::new("passwordHash", "password_hash", |u: &User| text(&u.password_hash)),
];

impl Entity for User {
    type Key = u64;
    const NAME: &'static str = "users";

    fn columns() -> &'static [ColumnMapping<Self>] {
        USER_COLUMNS
    }

    fn key(&self) -> u64 {
        self.id
    }

    fn set_key(&mut self, key: u64) {
        self.id = key;
    }
}

static ACCOUNT_COLUMNS: &[ColumnMapping<Account>] = &[
    ColumnMapping::new("userID", "user_id", |a: &Account| SqlValue::Int(a.user_id)),
    ColumnMapping::new("name", "name", |a: &Account| text(&a.name)),
    ColumnMapping::new("initialBalance", "initial_balance", |a: &Account| {
        SqlValue::Real(a.initial_balance)
    }),
    ColumnMapping::new("currency", "currency", |a: &Account| text(&a.currency)),
];

impl Entity for Account {
    type Key = u64;
    const NAME: &'static str = "accounts";

    fn columns() -> &'static [ColumnMapping<Self>] {
        ACCOUNT_COLUMNS
    }

    fn key(&self) -> u64 {
        self.id
    }

    fn set_key(&mut self, key: u64) {
        self.id = key;
    }
}

static STRATEGY_COLUMNS: &[ColumnMapping<Strategy>] = &[
    ColumnMapping::new("userID", "user_id", |s: &Strategy| SqlValue::Int(s.user_id)),
    ColumnMapping::new("name", "name", |s: &Strategy| text(&s.name)),
    ColumnMapping::new("description", "description", |s: &Strategy| text(&s.description)),
];

impl Entity for Strategy {
    type Key = u64;
    const NAME: &'static str = "strategies";

    fn columns() -> &'static [ColumnMapping<Self>] {
        STRATEGY_COLUMNS
    }

    fn key(&self) -> u64 {
        self.id
    }

    fn set_key(&mut self, key: u64) {
        self.id = key;
    }
}

static TRADE_COLUMNS: &[ColumnMapping<Trade>] = &[
    ColumnMapping::new("accountID", "account_id", |t: &Trade| SqlValue::Int(t.account_id)),
    ColumnMapping::new("strategyID", "strategy_id", |t: &Trade| SqlValue::Int(t.strategy_id)),
    ColumnMapping::new("status", "status", |t: &Trade| text(&t.status)),
    ColumnMapping::new("symbol", "symbol", |t: &Trade| text(&t.symbol)),
    ColumnMapping::new("direction", "direction", |t: &Trade| text(&t.direction)),
    ColumnMapping::new("plannedEntryPrice", "planned_entry_price", |t: &Trade| {
        SqlValue::Real(t.planned_entry_price)
    }),
    ColumnMapping::new("plannedStopLoss", "planned_stop_loss", |t: &Trade| {
        SqlValue::Real(t.planned_stop_loss)
    }),
    ColumnMapping::new("plannedTakeProfit", "planned_take_profit", |t: &Trade| {
        SqlValue::Real(t.planned_take_profit)
    }),
    ColumnMapping::new("positionSize", "position_size", |t: &Trade| {
        SqlValue::Real(t.position_size)
    }),
    ColumnMapping::new("plannedRiskAmount", "planned_risk_amount", |t: &Trade| {
        SqlValue::Real(t.planned_risk_amount)
    }),
    ColumnMapping::new("planNotes", "plan_notes", |t: &Trade| text(&t.plan_notes)),
    ColumnMapping::new("actualEntryTime", "actual_entry_time", |t: &Trade| {
        text(&t.actual_entry_time)
    }),
    ColumnMapping::new("actualEntryPrice", "actual_entry_price", |t: &Trade| {
        SqlValue::Real(t.actual_entry_price)
    }),
    ColumnMapping::new("actualExitTime", "actual_exit_time", |t: &Trade| {
        text(&t.actual_exit_time)
    }),
    ColumnMapping::new("actualExitPrice", "actual_exit_price", |t: &Trade| {
        SqlValue::Real(t.actual_exit_price)
    }),
    ColumnMapping::new("commission", "commission", |t: &Trade| SqlValue::Real(t.commission)),
    ColumnMapping::new("pnl", "pnl", |t: &Trade| SqlValue::Real(t.pnl)),
    ColumnMapping::new("rMultiple", "r_multiple", |t: &Trade| SqlValue::Real(t.r_multiple)),
    ColumnMapping::new("exitReason", "exit_reason", |t: &Trade| text(&t.exit_reason)),
    ColumnMapping::new("executionScore", "execution_score", |t: &Trade| {
        SqlValue::Int(t.execution_score)
    }),
    ColumnMapping::new("reflectionNotes", "reflection_notes", |t: &Trade| {
        text(&t.reflection_notes)
    }),
];

impl Entity for Trade {
    type Key = u64;
    const NAME: &'static str = "trades";

    fn columns() -> &'static [ColumnMapping<Self>] {
        TRADE_COLUMNS
    }

    fn key(&self) -> u64 {
        self.id
    }

    fn set_key(&mut self, key: u64) {
        self.id = key;
    }
}

static TAG_COLUMNS: &[ColumnMapping<Tag>] = &[
    ColumnMapping::new("userID", "user_id", |t: &Tag| SqlValue::Int(t.user_id)),
    ColumnMapping::new("name", "name", |t: &Tag| text(&t.name)),
    ColumnMapping::new("color", "color", |t: &Tag| text(&t.color)),
];

impl Entity for Tag {
    type Key = u64;
    const NAME: &'static str = "tags";

    fn columns() -> &'static [ColumnMapping<Self>] {
        TAG_COLUMNS
    }

    fn key(&self) -> u64 {
        self.id
    }

    fn set_key(&mut self, key: u64) {
        self.id = key;
    }
}

static TRADE_TAG_COLUMNS: &[ColumnMapping<TradeTag>] = &[ColumnMapping::new(
    "tagID",
    "tag_id",
    |t: &TradeTag| SqlValue::Int(t.tag_id),
)];

impl Entity for TradeTag {
    type Key = u64;
    const NAME: &'static str = "tradeTags";
    const KEY_COLUMN: &'static str = "trade_id";
    const GENERATED_KEY: bool = false;

    fn columns() -> &'static [ColumnMapping<Self>] {
        TRADE_TAG_COLUMNS
    }

    fn key(&self) -> u64 {
        self.trade_id
    }

    fn set_key(&mut self, key: u64) {
        self.trade_id = key;
    }
}

static SNAPSHOT_COLUMNS: &[ColumnMapping<Snapshot>] = &[
    ColumnMapping::new("tradeID", "trade_id", |s: &Snapshot| SqlValue::Int(s.trade_id)),
    ColumnMapping::new("type", "type", |s: &Snapshot| text(&s.kind)),
    ColumnMapping::new("imageURL", "image_url", |s: &Snapshot| text(&s.image_url)),
];

impl Entity for Snapshot {
    type Key = u64;
    const NAME: &'static str = "snapshots";

    fn columns() -> &'static [ColumnMapping<Self>] {
        SNAPSHOT_COLUMNS
    }

    fn key(&self) -> u64 {
        self.id
    }

    fn set_key(&mut self, key: u64) {
        self.id = key;
    }
}
