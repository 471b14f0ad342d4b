use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Directory role. Each role is stored in its own collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    /// A guest who books through the customer app.
    User,
    Staff,
    Admin,
}

impl AccountRole {
    /// Display order used by the directory: admins first, customers last.
    pub const ALL: [AccountRole; 3] = [AccountRole::Admin, AccountRole::Staff, AccountRole::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::User => "user",
            AccountRole::Staff => "staff",
            AccountRole::Admin => "admin",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AccountRole::User => "Customer",
            AccountRole::Staff => "Staff",
            AccountRole::Admin => "Admin",
        }
    }

    /// Only operators sign in to the console.
    pub fn can_sign_in(&self) -> bool {
        matches!(self, AccountRole::Staff | AccountRole::Admin)
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" | "users" => Ok(AccountRole::User),
            "staff" => Ok(AccountRole::Staff),
            "admin" | "admins" => Ok(AccountRole::Admin),
            other => Err(format!("unknown account role '{}'", other)),
        }
    }
}

/// Account — a customer, staff member, or administrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(default)]
    pub id: String,

    pub role: AccountRole,

    #[serde(default)]
    pub full_name: String,

    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// argon2id PHC string. Stripped by [`Account::redacted`] before an
    /// account leaves the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Account {
    pub fn redacted(mut self) -> Self {
        self.password_hash = None;
        self
    }

    /// Up to two initials from the full name, for avatars.
    pub fn initials(&self) -> String {
        let initials: String = self
            .full_name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect();
        if initials.is_empty() {
            "?".to_string()
        } else {
            initials
        }
    }
}
