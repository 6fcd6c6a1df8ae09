//! Repository layer for database operations.
//!
//! Methods are organized across submodules by table:
//! - `feeds.rs` - Feed/order records and their bot-driven mutations
//! - `wellness.rs` - Wellness records, plain and conditional writes

mod feeds;
mod wellness;

use crate::domain::{Address, TimeMs};
use sqlx::sqlite::{SqliteConnection, SqlitePool};
use sqlx::Row;
use std::str::FromStr;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Every wallet that has owned a feed, in address order.
    pub async fn list_wallets(&self) -> Result<Vec<Address>, sqlx::Error> {
        let rows = sqlx::query("SELECT address FROM wallets ORDER BY address ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                let address: String = row.get("address");
                parse_address(&address)
            })
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Record that `wallet` was seen at `at`, creating the row on first sight.
///
/// Takes a connection so feed inserts can run it inside their transaction.
pub(crate) async fn upsert_wallet(
    conn: &mut SqliteConnection,
    wallet: &Address,
    at: TimeMs,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO wallets (address, first_seen_ms, last_seen_ms)
        VALUES (?, ?, ?)
        ON CONFLICT(address) DO UPDATE SET
            last_seen_ms = MAX(wallets.last_seen_ms, excluded.last_seen_ms)
        "#,
    )
    .bind(wallet.as_str())
    .bind(at.as_ms())
    .bind(at.as_ms())
    .execute(conn)
    .await?;
    Ok(())
}

pub(crate) fn parse_address(s: &str) -> Result<Address, sqlx::Error> {
    Address::from_str(s).map_err(|e| decode_error(format!("invalid address {}: {}", s, e)))
}

pub(crate) fn decode_error(msg: String) -> sqlx::Error {
    sqlx::Error::Decode(msg.into())
}
