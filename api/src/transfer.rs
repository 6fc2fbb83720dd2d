//! Moving money between two accounts.
//!
//! Both balance legs and the ledger row are written in one SQLite
//! transaction. The debit is the first statement of that transaction, so the
//! write lock is taken before anything else and concurrent transfers touching
//! the same account queue behind it. Balances are adjusted in SQL
//! (`balance = balance - ?`) rather than written back from values read
//! earlier, which leaves no window for a lost update.

use chrono::Utc;
use sqlx::sqlite::SqlitePool;

use crate::{db, error::AppError, models::ledger::TransferReceipt, validate};

#[derive(Debug)]
pub enum TransferOutcome {
    Completed(TransferReceipt),
    /// Nothing was written: no account has the recipient's email.
    RecipientNotFound,
}

/// Moves `amount` from the account of `caller_email` to `recipient_email`.
///
/// `caller_email` must come from a verified session, never from the request
/// body.
pub async fn transfer(
    pool: &SqlitePool,
    caller_email: &str,
    recipient_email: &str,
    amount: i64,
) -> Result<TransferOutcome, AppError> {
    if !validate::is_valid_email(recipient_email) {
        return Err(AppError::validation("Invalid email provided"));
    }
    if amount <= 0 {
        return Err(AppError::validation("Transfer amount must be positive"));
    }
    if recipient_email == caller_email {
        return Err(AppError::validation("Cannot transfer money to your own account"));
    }

    let Some(recipient) = db::find_by_email(pool, recipient_email).await? else {
        return Ok(TransferOutcome::RecipientNotFound);
    };

    let sender = db::find_by_email(pool, caller_email)
        .await?
        .ok_or_else(|| AppError::unauthorized(format!("no account for {}", caller_email)))?;

    if amount > sender.balance {
        return Err(AppError::InsufficientFunds {
            balance: sender.balance,
        });
    }
    if recipient.balance.checked_add(amount).is_none() {
        return Err(AppError::validation("Transfer would overflow the recipient's balance"));
    }

    let mut tx = pool.begin().await?;

    let sender_balance: Option<i64> = sqlx::query_scalar(
        "UPDATE accounts SET balance = balance - ?1 WHERE id = ?2 AND balance >= ?1 RETURNING balance",
    )
    .bind(amount)
    .bind(sender.id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(sender_balance) = sender_balance else {
        // Drained or deleted between the read above and the lock.
        let current = db::find_by_id(&mut *tx, sender.id).await?;
        tx.rollback().await?;
        return Err(match current {
            Some(account) => AppError::InsufficientFunds {
                balance: account.balance,
            },
            None => AppError::unauthorized(format!("no account for {}", sender.email)),
        });
    };

    let credited: Option<i64> = sqlx::query_scalar(
        "UPDATE accounts SET balance = balance + ?1 WHERE id = ?2 AND balance <= ?3 RETURNING balance",
    )
    .bind(amount)
    .bind(recipient.id)
    .bind(i64::MAX - amount)
    .fetch_optional(&mut *tx)
    .await?;

    if credited.is_none() {
        let still_there = db::find_by_id(&mut *tx, recipient.id).await?.is_some();
        tx.rollback().await?;
        if still_there {
            return Err(AppError::validation(
                "Transfer would overflow the recipient's balance",
            ));
        }
        return Ok(TransferOutcome::RecipientNotFound);
    }

    let created_at = Utc::now();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO transfers (sender_id, recipient_id, sender, recipient, amount, created_at) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(sender.id)
    .bind(recipient.id)
    .bind(&sender.email)
    .bind(&recipient.email)
    .bind(amount)
    .bind(created_at)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        transfer_id = id,
        from = %sender.email,
        to = %recipient.email,
        amount,
        "transfer completed"
    );

    Ok(TransferOutcome::Completed(TransferReceipt {
        id,
        from: sender.email,
        to: recipient.email,
        amount,
        balance: sender_balance,
        created_at,
    }))
}
