use super::{decode_error, parse_address, upsert_wallet, Repository};
use crate::domain::{Address, Decimal, FeedKind, FeedRecord, FeedStatus, NewFeed, TimeMs};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;

const FEED_COLUMNS: &str = r#"
    id, wallet, kind, src_token, dst_token, src_symbol, dst_symbol, chunk_size,
    period_secs, status, created_at_ms, bot_execution_count, next_fill_time_ms, order_hash
"#;

impl Repository {
    /// Insert a new feed (status `active`, no executions) and register its wallet.
    pub async fn insert_feed(
        &self,
        feed: &NewFeed,
        created_at: TimeMs,
    ) -> Result<FeedRecord, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        upsert_wallet(&mut tx, &feed.wallet, created_at).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO feeds (
                wallet, kind, src_token, dst_token, src_symbol, dst_symbol, chunk_size,
                period_secs, status, created_at_ms, bot_execution_count, next_fill_time_ms,
                order_hash
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, NULL, ?)
            "#,
        )
        .bind(feed.wallet.as_str())
        .bind(feed.kind.as_str())
        .bind(feed.src_token.as_str())
        .bind(feed.dst_token.as_str())
        .bind(feed.src_symbol.as_deref())
        .bind(feed.dst_symbol.as_deref())
        .bind(feed.chunk_size.to_canonical_string())
        .bind(feed.period_secs)
        .bind(FeedStatus::Active.as_str())
        .bind(created_at.as_ms())
        .bind(feed.order_hash.as_deref())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(FeedRecord {
            id: result.last_insert_rowid(),
            wallet: feed.wallet.clone(),
            kind: feed.kind,
            src_token: feed.src_token.clone(),
            dst_token: feed.dst_token.clone(),
            src_symbol: feed.src_symbol.clone(),
            dst_symbol: feed.dst_symbol.clone(),
            chunk_size: feed.chunk_size,
            period_secs: feed.period_secs,
            status: FeedStatus::Active,
            created_at,
            bot_execution_count: 0,
            next_fill_time: None,
            order_hash: feed.order_hash.clone(),
        })
    }

    pub async fn get_feed(&self, id: i64) -> Result<Option<FeedRecord>, sqlx::Error> {
        let row = sqlx::query(&format!("SELECT {} FROM feeds WHERE id = ?", FEED_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(feed_from_row).transpose()
    }

    /// All feeds owned by `wallet`, oldest first.
    pub async fn list_feeds(&self, wallet: &Address) -> Result<Vec<FeedRecord>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM feeds WHERE wallet = ? ORDER BY created_at_ms ASC, id ASC",
            FEED_COLUMNS
        ))
        .bind(wallet.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(feed_from_row).collect()
    }

    /// Move a feed from `from` to `to`.
    ///
    /// Returns false when the feed's status is no longer `from`, so a
    /// concurrent bot update is never overwritten.
    pub async fn update_feed_status(
        &self,
        id: i64,
        from: FeedStatus,
        to: FeedStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE feeds SET status = ? WHERE id = ? AND status = ?")
            .bind(to.as_str())
            .bind(id)
            .bind(from.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count one bot execution and store the next scheduled fill time.
    ///
    /// Returns false when the feed does not exist or is already terminal.
    pub async fn record_execution(
        &self,
        id: i64,
        next_fill_time: Option<TimeMs>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE feeds
            SET bot_execution_count = bot_execution_count + 1,
                next_fill_time_ms = ?
            WHERE id = ? AND status IN ('active', 'executing')
            "#,
        )
        .bind(next_fill_time.map(|t| t.as_ms()))
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn feed_from_row(row: &SqliteRow) -> Result<FeedRecord, sqlx::Error> {
    let id: i64 = row.get("id");
    let wallet: String = row.get("wallet");
    let kind: String = row.get("kind");
    let src_token: String = row.get("src_token");
    let dst_token: String = row.get("dst_token");
    let chunk_size: String = row.get("chunk_size");
    let status: String = row.get("status");
    let bot_execution_count: i64 = row.get("bot_execution_count");
    let next_fill_time_ms: Option<i64> = row.get("next_fill_time_ms");

    Ok(FeedRecord {
        id,
        wallet: parse_address(&wallet)?,
        kind: FeedKind::from_str(&kind).map_err(decode_error)?,
        src_token: parse_address(&src_token)?,
        dst_token: parse_address(&dst_token)?,
        src_symbol: row.get("src_symbol"),
        dst_symbol: row.get("dst_symbol"),
        chunk_size: Decimal::from_str(&chunk_size).map_err(|e| {
            decode_error(format!("feed {}: invalid chunk_size {}: {}", id, chunk_size, e))
        })?,
        period_secs: row.get("period_secs"),
        status: FeedStatus::from_str(&status).map_err(decode_error)?,
        created_at: TimeMs::new(row.get("created_at_ms")),
        bot_execution_count: u32::try_from(bot_execution_count).map_err(|_| {
            decode_error(format!(
                "feed {}: invalid bot_execution_count {}",
                id, bot_execution_count
            ))
        })?,
        next_fill_time: next_fill_time_ms.map(TimeMs::new),
        order_hash: row.get("order_hash"),
    })
}
