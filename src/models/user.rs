use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user row, minus the password hash. The hash never leaves the
/// credential store.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct Profile {
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub disabled: bool,
}

impl From<User> for Profile {
    fn from(u: User) -> Self {
        Self {
            username: u.username,
            email: u.email,
            full_name: u.full_name,
            disabled: u.disabled,
        }
    }
}
