use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::{
    config::Config,
    models::{
        account::{Account, NewAccount},
        ledger::LedgerEntry,
    },
};

const ACCOUNT_COLUMNS: &str =
    "id, first_name, last_name, email, password_hash, balance, created_at";

pub async fn connect(config: &Config) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(config.busy_timeout);

    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!().run(pool).await
}

pub async fn insert_account(pool: &SqlitePool, account: &NewAccount) -> Result<Account, sqlx::Error> {
    let query = format!(
        "INSERT INTO accounts (first_name, last_name, email, password_hash, balance, created_at) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING {}",
        ACCOUNT_COLUMNS
    );
    sqlx::query_as::<_, Account>(&query)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.balance)
        .bind(account.created_at)
        .fetch_one(pool)
        .await
}

pub async fn list_accounts(pool: &SqlitePool) -> Result<Vec<Account>, sqlx::Error> {
    let query = format!("SELECT {} FROM accounts ORDER BY id", ACCOUNT_COLUMNS);
    sqlx::query_as::<_, Account>(&query).fetch_all(pool).await
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Account>, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let query = format!("SELECT {} FROM accounts WHERE id = ?", ACCOUNT_COLUMNS);
    sqlx::query_as::<_, Account>(&query)
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn find_by_email<'e, E>(executor: E, email: &str) -> Result<Option<Account>, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let query = format!("SELECT {} FROM accounts WHERE email = ?", ACCOUNT_COLUMNS);
    sqlx::query_as::<_, Account>(&query)
        .bind(email)
        .fetch_optional(executor)
        .await
}

/// Returns whether a row was removed.
pub async fn delete_account(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Ledger rows the account sent or received, oldest first.
pub async fn transfers_for(pool: &SqlitePool, account_id: i64) -> Result<Vec<LedgerEntry>, sqlx::Error> {
    sqlx::query_as::<_, LedgerEntry>(
        "SELECT id, sender_id, recipient_id, sender, recipient, amount, created_at FROM transfers \
         WHERE sender_id = ?1 OR recipient_id = ?1 ORDER BY id",
    )
    .bind(account_id)
    .fetch_all(pool)
    .await
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[tokio::test]
    async fn insert_then_lookup() {
        let pool = memory_pool().await;
        let alice = seed_default(&pool, "alice@x.com").await;

        assert!(alice.id > 0);
        assert_eq!(alice.balance, 1000);

        let by_id = find_by_id(&pool, alice.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "alice@x.com");

        let by_email = find_by_email(&pool, "alice@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, alice.id);

        assert!(find_by_email(&pool, "nobody@x.com").await.unwrap().is_none());
        assert!(find_by_id(&pool, alice.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn email_is_unique() {
        let pool = memory_pool().await;
        seed_default(&pool, "alice@x.com").await;

        let duplicate = NewAccount {
            first_name: "Other".into(),
            last_name: "Alice".into(),
            email: "alice@x.com".into(),
            password_hash: "h".into(),
            balance: 1000,
            created_at: chrono::Utc::now(),
        };
        let err = insert_account(&pool, &duplicate).await.unwrap_err();
        assert!(err
            .as_database_error()
            .map(|e| e.is_unique_violation())
            .unwrap_or(false));
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let pool = memory_pool().await;
        seed_default(&pool, "a@x.com").await;
        seed_default(&pool, "b@x.com").await;
        seed_default(&pool, "c@x.com").await;

        let emails: Vec<_> = list_accounts(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.email)
            .collect();
        assert_eq!(emails, ["a@x.com", "b@x.com", "c@x.com"]);
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed() {
        let pool = memory_pool().await;
        let alice = seed_default(&pool, "alice@x.com").await;

        assert!(delete_account(&pool, alice.id).await.unwrap());
        assert!(!delete_account(&pool, alice.id).await.unwrap());
        assert!(find_by_id(&pool, alice.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn negative_balance_is_refused_by_storage() {
        let pool = memory_pool().await;
        seed_default(&pool, "alice@x.com").await;

        let result = sqlx::query("UPDATE accounts SET balance = -1 WHERE email = ?")
            .bind("alice@x.com")
            .execute(&pool)
            .await;
        assert!(result.is_err());
    }
}
