mod entities;
mod types;

pub use types::{Account, Snapshot, Strategy, Tag, Trade, TradeTag, User};
