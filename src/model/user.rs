use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Platform identifier of a staff member or customer-facing operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl UserId {
    /// Mention syntax used in rendered messages.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.0)
    }
}
