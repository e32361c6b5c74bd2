//! Account user types

use serde::{Deserialize, Serialize};

/// A user of the account, as returned by `list_users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: Option<String>,
    pub administrator: Option<bool>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    /// Whether this record is the authenticated caller.
    pub me: Option<bool>,
    pub account_owner: Option<bool>,
}
