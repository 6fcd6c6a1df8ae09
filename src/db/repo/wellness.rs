use super::{decode_error, parse_address, Repository};
use crate::domain::{Address, Decimal, TimeMs, WellnessEvent, WellnessRecord};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;

impl Repository {
    pub async fn get_wellness_record(
        &self,
        wallet: &Address,
    ) -> Result<Option<WellnessRecord>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT wallet, current_wellness, last_fed_time_ms, last_recomputed_at_ms, history_json
            FROM wellness
            WHERE wallet = ?
            "#,
        )
        .bind(wallet.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(wellness_from_row).transpose()
    }

    /// Unconditional upsert; the last writer wins.
    pub async fn upsert_wellness_record(&self, record: &WellnessRecord) -> Result<(), sqlx::Error> {
        let history_json = encode_history(&record.history)?;
        sqlx::query(
            r#"
            INSERT INTO wellness (wallet, current_wellness, last_fed_time_ms, last_recomputed_at_ms, history_json)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(wallet) DO UPDATE SET
                current_wellness = excluded.current_wellness,
                last_fed_time_ms = excluded.last_fed_time_ms,
                last_recomputed_at_ms = excluded.last_recomputed_at_ms,
                history_json = excluded.history_json
            "#,
        )
        .bind(record.wallet.as_str())
        .bind(record.current_wellness.to_canonical_string())
        .bind(record.last_fed_time.as_ms())
        .bind(record.last_recomputed_at.as_ms())
        .bind(history_json)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Write `record` only if the stored row still matches what was read.
    ///
    /// `expected_recomputed_at` is the `last_recomputed_at` of the record the
    /// caller started from, or None if there was no record. Returns false
    /// when another writer got there first.
    pub async fn put_wellness_record_if_unchanged(
        &self,
        record: &WellnessRecord,
        expected_recomputed_at: Option<TimeMs>,
    ) -> Result<bool, sqlx::Error> {
        let history_json = encode_history(&record.history)?;
        let result = match expected_recomputed_at {
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO wellness (wallet, current_wellness, last_fed_time_ms, last_recomputed_at_ms, history_json)
                    VALUES (?, ?, ?, ?, ?)
                    ON CONFLICT(wallet) DO NOTHING
                    "#,
                )
                .bind(record.wallet.as_str())
                .bind(record.current_wellness.to_canonical_string())
                .bind(record.last_fed_time.as_ms())
                .bind(record.last_recomputed_at.as_ms())
                .bind(history_json)
                .execute(&self.pool)
                .await?
            }
            Some(expected) => {
                sqlx::query(
                    r#"
                    UPDATE wellness
                    SET current_wellness = ?,
                        last_fed_time_ms = ?,
                        last_recomputed_at_ms = ?,
                        history_json = ?
                    WHERE wallet = ? AND last_recomputed_at_ms = ?
                    "#,
                )
                .bind(record.current_wellness.to_canonical_string())
                .bind(record.last_fed_time.as_ms())
                .bind(record.last_recomputed_at.as_ms())
                .bind(history_json)
                .bind(record.wallet.as_str())
                .bind(expected.as_ms())
                .execute(&self.pool)
                .await?
            }
        };
        Ok(result.rows_affected() > 0)
    }
}

fn encode_history(history: &[WellnessEvent]) -> Result<String, sqlx::Error> {
    serde_json::to_string(history)
        .map_err(|e| sqlx::Error::Protocol(format!("cannot encode wellness history: {}", e)))
}

fn wellness_from_row(row: &SqliteRow) -> Result<WellnessRecord, sqlx::Error> {
    let wallet: String = row.get("wallet");
    let current_wellness: String = row.get("current_wellness");
    let history_json: String = row.get("history_json");

    Ok(WellnessRecord {
        wallet: parse_address(&wallet)?,
        current_wellness: Decimal::from_str(&current_wellness).map_err(|e| {
            decode_error(format!(
                "wellness {}: invalid current_wellness {}: {}",
                wallet, current_wellness, e
            ))
        })?,
        last_fed_time: TimeMs::new(row.get("last_fed_time_ms")),
        last_recomputed_at: TimeMs::new(row.get("last_recomputed_at_ms")),
        history: serde_json::from_str(&history_json)
            .map_err(|e| decode_error(format!("wellness {}: invalid history: {}", wallet, e)))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use crate::domain::WellnessReason;
    use tempfile::TempDir;

    async fn setup() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.db").to_string_lossy().to_string();
        let pool = init_db(&path).await.expect("init_db failed");
        (Repository::new(pool), temp_dir)
    }

    fn record(recomputed_at: i64, wellness: &str) -> WellnessRecord {
        WellnessRecord {
            wallet: Address::from_str("0x1111111111111111111111111111111111111111").unwrap(),
            current_wellness: Decimal::from_str(wellness).unwrap(),
            last_fed_time: TimeMs::new(500),
            last_recomputed_at: TimeMs::new(recomputed_at),
            history: vec![WellnessEvent {
                timestamp: TimeMs::new(500),
                delta: Decimal::from_str("0.5").unwrap(),
                reason: WellnessReason::RecurringCreated,
                detail: "USDC → WETH".into(),
            }],
        }
    }

    #[tokio::test]
    async fn test_upsert_roundtrip() {
        let (repo, _temp) = setup().await;
        let rec = record(1000, "8.5");
        repo.upsert_wellness_record(&rec).await.unwrap();
        assert_eq!(
            repo.get_wellness_record(&rec.wallet).await.unwrap(),
            Some(rec.clone())
        );

        let newer = record(2000, "7");
        repo.upsert_wellness_record(&newer).await.unwrap();
        assert_eq!(
            repo.get_wellness_record(&rec.wallet).await.unwrap(),
            Some(newer)
        );
    }

    #[tokio::test]
    async fn test_conditional_insert_detects_existing_row() {
        let (repo, _temp) = setup().await;
        let first = record(1000, "8");
        assert!(repo
            .put_wellness_record_if_unchanged(&first, None)
            .await
            .unwrap());
        assert!(!repo
            .put_wellness_record_if_unchanged(&record(1100, "9"), None)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_conditional_update_requires_matching_watermark() {
        let (repo, _temp) = setup().await;
        repo.upsert_wellness_record(&record(1000, "8")).await.unwrap();

        assert!(!repo
            .put_wellness_record_if_unchanged(&record(2000, "9"), Some(TimeMs::new(999)))
            .await
            .unwrap());
        assert!(repo
            .put_wellness_record_if_unchanged(&record(2000, "9"), Some(TimeMs::new(1000)))
            .await
            .unwrap());

        let stored = repo
            .get_wellness_record(&record(0, "0").wallet)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.last_recomputed_at, TimeMs::new(2000));
        assert_eq!(stored.current_wellness, Decimal::from_str("9").unwrap());
    }
}
