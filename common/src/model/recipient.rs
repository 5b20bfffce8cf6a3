use crate::model::ChatId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Permission level fixed at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Superadmin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
        })
    }
}

/// A registered chat that can receive distributed rows.
///
/// This is also the exact body posted to `POST /users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    pub chat_id: ChatId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::User
}
