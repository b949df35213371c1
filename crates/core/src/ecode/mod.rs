//! Application error codes and the response envelope.
//!
//! Generic codes live in the `1000xx` range. Entity business codes are
//! `200000 + no * 100 + operation`.

mod codes;
mod reply;

pub use codes::{
    all_codes, hcode, BusinessCodes, ErrorCode, Operation, ACCOUNTS, ALREADY_EXISTS,
    INTERNAL_SERVER_ERROR, INVALID_PARAMS, NOT_FOUND, SNAPSHOTS, STRATEGIES, SUCCESS, TAGS,
    TRADES, TRADE_TAGS, UNAUTHORIZED, USERNAME_ALREADY_EXISTS, USERNAME_OR_PASSWORD_NOT_FOUND,
    USERS,
};
pub use reply::Reply;
