use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

/// An application error code and its message, as carried in the response
/// envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorCode {
    pub code: i32,
    pub msg: Cow<'static, str>,
}

impl ErrorCode {
    pub const fn new(code: i32, msg: &'static str) -> Self {
        Self {
            code,
            msg: Cow::Borrowed(msg),
        }
    }

    /// Same code, different message.
    pub fn with_msg(&self, msg: impl Into<String>) -> Self {
        Self {
            code: self.code,
            msg: Cow::Owned(msg.into()),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.msg, self.code)
    }
}

pub const SUCCESS: ErrorCode = ErrorCode::new(0, "ok");
pub const INVALID_PARAMS: ErrorCode = ErrorCode::new(100001, "Invalid Parameter");
pub const UNAUTHORIZED: ErrorCode = ErrorCode::new(100002, "Unauthorized");
pub const INTERNAL_SERVER_ERROR: ErrorCode = ErrorCode::new(100003, "Internal Server Error");
pub const NOT_FOUND: ErrorCode = ErrorCode::new(100004, "Not Found");
pub const ALREADY_EXISTS: ErrorCode = ErrorCode::new(100005, "Already Exists");

/// Base of an entity's business codes.
pub const fn hcode(no: i32) -> i32 {
    200000 + no * 100
}

/// Repository operation a business code is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create = 1,
    DeleteById = 2,
    UpdateById = 3,
    GetById = 4,
    List = 5,
    DeleteByIds = 6,
    GetByCondition = 7,
    ListByIds = 8,
    ListByLastId = 9,
}

impl Operation {
    pub const ALL: [Operation; 9] = [
        Operation::Create,
        Operation::DeleteById,
        Operation::UpdateById,
        Operation::GetById,
        Operation::List,
        Operation::DeleteByIds,
        Operation::GetByCondition,
        Operation::ListByIds,
        Operation::ListByLastId,
    ];

    /// Operations every entity has.
    pub const CRUD: [Operation; 5] = [
        Operation::Create,
        Operation::DeleteById,
        Operation::UpdateById,
        Operation::GetById,
        Operation::List,
    ];

    fn message(self, name: &str) -> String {
        match self {
            Operation::Create => format!("failed to create {name}"),
            Operation::DeleteById => format!("failed to delete {name}"),
            Operation::UpdateById => format!("failed to update {name}"),
            Operation::GetById => format!("failed to get {name} details"),
            Operation::List => format!("failed to list of {name}"),
            Operation::DeleteByIds => format!("failed to delete by batch ids {name}"),
            Operation::GetByCondition => format!("failed to get {name} details by conditions"),
            Operation::ListByIds => format!("failed to list by batch ids {name}"),
            Operation::ListByLastId => format!("failed to list by last id {name}"),
        }
    }
}

/// Business code range of one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessCodes {
    pub no: i32,
    pub name: &'static str,
}

impl BusinessCodes {
    pub const fn new(no: i32, name: &'static str) -> Self {
        Self { no, name }
    }

    pub fn code(&self, op: Operation) -> ErrorCode {
        ErrorCode {
            code: hcode(self.no) + op as i32,
            msg: Cow::Owned(op.message(self.name)),
        }
    }
}

pub const USERS: BusinessCodes = BusinessCodes::new(78, "users");
pub const ACCOUNTS: BusinessCodes = BusinessCodes::new(79, "accounts");
pub const TRADES: BusinessCodes = BusinessCodes::new(80, "trades");
pub const STRATEGIES: BusinessCodes = BusinessCodes::new(76, "strategies");
pub const TAGS: BusinessCodes = BusinessCodes::new(36, "tags");
pub const TRADE_TAGS: BusinessCodes = BusinessCodes::new(1, "tradeTags");
pub const SNAPSHOTS: BusinessCodes = BusinessCodes::new(73, "snapshots");

pub const USERNAME_OR_PASSWORD_NOT_FOUND: ErrorCode =
    ErrorCode::new(hcode(78) + 10, "username or password not found");
pub const USERNAME_ALREADY_EXISTS: ErrorCode =
    ErrorCode::new(hcode(78) + 11, "username already exists");

/// Every code the service can answer with, ordered by code.
pub fn all_codes() -> Vec<ErrorCode> {
    let mut codes = vec![
        SUCCESS,
        INVALID_PARAMS,
        UNAUTHORIZED,
        INTERNAL_SERVER_ERROR,
        NOT_FOUND,
        ALREADY_EXISTS,
        USERNAME_OR_PASSWORD_NOT_FOUND,
        USERNAME_ALREADY_EXISTS,
    ];
    for entity in [STRATEGIES, TAGS, TRADE_TAGS, SNAPSHOTS, ACCOUNTS, TRADES] {
        codes.extend(Operation::CRUD.iter().map(|op| entity.code(*op)));
    }
    codes.extend(Operation::ALL.iter().map(|op| USERS.code(*op)));
    codes.sort_by_key(|c| c.code);
    codes
}
