use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the append-only `transfers` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: i64,
    #[serde(rename = "fromId")]
    pub sender_id: i64,
    #[serde(rename = "toId")]
    pub recipient_id: i64,
    #[serde(rename = "from")]
    pub sender: String,
    #[serde(rename = "to")]
    pub recipient: String,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    #[serde(default)]
    pub to: String,
    pub amount: i64,
}

/// Returned to the sender once both legs and the ledger row are committed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferReceipt {
    pub id: i64,
    pub from: String,
    pub to: String,
    pub amount: i64,
    /// Sender's balance after the debit.
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}
