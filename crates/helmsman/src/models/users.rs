use serde::Deserialize;

/// Login and register body.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn is_blank(&self) -> bool {
        self.username.trim().is_empty() || self.password.is_empty()
    }
}

/// Batch body for `delete/ids` and `list/ids`.
#[derive(Debug, Deserialize)]
pub struct IdsRequest {
    pub ids: Vec<u64>,
}

/// Query string of the cursor list.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LastIdQuery {
    #[serde(rename = "lastID")]
    pub last_id: u64,
    pub limit: u32,
    pub sort: String,
}
