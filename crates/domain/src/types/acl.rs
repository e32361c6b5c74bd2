//! Access control entries

use serde::{Deserialize, Serialize};

/// One access control grant: `subject` may perform `action` on `scope`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessControl {
    pub subject: String,
    pub action: String,
    pub scope: String,
    pub grant_option: Option<bool>,
}
