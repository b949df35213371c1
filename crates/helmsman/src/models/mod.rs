mod journal;
mod users;

pub use journal::{
    AccountPayload, SnapshotPayload, StrategyPayload, TagPayload, TradePayload, TradeTagPayload,
    UserPayload,
};
pub use users::{Credentials, IdsRequest, LastIdQuery};
