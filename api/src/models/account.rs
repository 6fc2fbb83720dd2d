use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Balance every account opens with, in the smallest currency unit.
pub const STARTING_BALANCE: i64 = 1000;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}

/// An account that has not been stored yet.
#[derive(Debug)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccount {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_account_never_contains_the_hash() {
        let account = Account {
            id: 1,
            first_name: "Alice".into(),
            last_name: "Liddell".into(),
            email: "alice@x.com".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            balance: STARTING_BALANCE,
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&account).unwrap();
        let text = value.to_string();

        assert!(value.get("passwordHash").is_none());
        assert!(value.get("password_hash").is_none());
        assert!(!text.contains("argon2"));
        assert_eq!(value["firstName"], "Alice");
        assert_eq!(value["balance"], 1000);
        assert!(value["createdAt"].is_string());
    }
}
