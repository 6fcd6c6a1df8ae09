use crate::config::WellnessWriteMode;
use crate::db::Repository;
use crate::domain::{Address, TimeMs, WellnessRecord};
use crate::engine::recompute_wellness;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, info, warn};

const SWEEP_CONCURRENCY: usize = 4;
/// Attempts per recompute before a conflict is reported to the caller.
const CONFLICT_ATTEMPTS: usize = 3;

/// Loads a wallet's feeds, runs the recompute fold, and persists the result.
pub struct WellnessService {
    repo: Arc<Repository>,
    mode: WellnessWriteMode,
    wallet_locks: Mutex<HashMap<Address, Arc<tokio::sync::Mutex<()>>>>,
}

impl WellnessService {
    pub fn new(repo: Arc<Repository>, mode: WellnessWriteMode) -> Self {
        Self {
            repo,
            mode,
            wallet_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Rebuild and store the wellness record for `wallet` as of `now`.
    ///
    /// In `Serialized` mode a write that loses to another process is
    /// re-read and recomputed; `PersistenceConflict` is returned only once
    /// every attempt has lost.
    pub async fn recompute(
        &self,
        wallet: &Address,
        now: TimeMs,
    ) -> Result<WellnessRecord, WellnessError> {
        match self.mode {
            WellnessWriteMode::LastWriteWins => {
                let (record, _) = self.compute(wallet, now).await?;
                self.repo.upsert_wellness_record(&record).await?;
                Ok(record)
            }
            WellnessWriteMode::Serialized => {
                let lock = self.lock_for(wallet);
                let result = {
                    let _guard = lock.lock().await;
                    self.recompute_conditionally(wallet, now).await
                };
                drop(lock);
                self.release_lock(wallet);
                result
            }
        }
    }

    async fn recompute_conditionally(
        &self,
        wallet: &Address,
        now: TimeMs,
    ) -> Result<WellnessRecord, WellnessError> {
        for attempt in 1..=CONFLICT_ATTEMPTS {
            let (record, expected) = self.compute(wallet, now).await?;
            if self
                .repo
                .put_wellness_record_if_unchanged(&record, expected)
                .await?
            {
                return Ok(record);
            }
            warn!(wallet = %wallet, attempt, "Wellness record changed during recompute");
        }
        Err(WellnessError::PersistenceConflict(wallet.clone()))
    }

    /// Stored record, or a fresh recompute when the wallet has none yet.
    ///
    /// Wallets with no feeds get the baseline record without anything being
    /// written, so lookups of unknown addresses leave no trace.
    pub async fn current(
        &self,
        wallet: &Address,
        now: TimeMs,
    ) -> Result<WellnessRecord, WellnessError> {
        if let Some(record) = self.repo.get_wellness_record(wallet).await? {
            return Ok(record);
        }
        let feeds = self.repo.list_feeds(wallet).await?;
        if feeds.is_empty() {
            return Ok(recompute_wellness(wallet, &feeds, None, now));
        }
        self.recompute(wallet, now).await
    }

    /// Recompute every known wallet. Returns how many were refreshed.
    ///
    /// A wallet that fails is logged and skipped; the rest of the sweep
    /// still runs.
    pub async fn recompute_all(&self, now: TimeMs) -> Result<usize, WellnessError> {
        let wallets = self.repo.list_wallets().await?;
        let total = wallets.len();
        let mut refreshed = 0usize;

        for batch in wallets.chunks(SWEEP_CONCURRENCY) {
            let mut pending = Vec::with_capacity(batch.len());
            for wallet in batch {
                pending.push(self.recompute(wallet, now));
            }
            for (wallet, result) in batch.iter().zip(join_all(pending).await) {
                match result {
                    Ok(_) => refreshed += 1,
                    Err(e) => warn!(wallet = %wallet, error = %e, "Wellness sweep skipped wallet"),
                }
            }
        }

        info!(wallets = total, refreshed, "Wellness sweep complete");
        Ok(refreshed)
    }

    async fn compute(
        &self,
        wallet: &Address,
        now: TimeMs,
    ) -> Result<(WellnessRecord, Option<TimeMs>), WellnessError> {
        let existing = self.repo.get_wellness_record(wallet).await?;
        let feeds = self.repo.list_feeds(wallet).await?;
        let record = recompute_wellness(wallet, &feeds, existing.as_ref(), now);

        debug!(
            wallet = %wallet,
            feeds = feeds.len(),
            wellness = %record.current_wellness,
            events = record.history.len(),
            "Recomputed wellness"
        );

        Ok((record, existing.map(|r| r.last_recomputed_at)))
    }

    fn locks(&self) -> MutexGuard<'_, HashMap<Address, Arc<tokio::sync::Mutex<()>>>> {
        self.wallet_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_for(&self, wallet: &Address) -> Arc<tokio::sync::Mutex<()>> {
        self.locks().entry(wallet.clone()).or_default().clone()
    }

    /// Drop the wallet's lock once no other recompute holds or waits on it.
    fn release_lock(&self, wallet: &Address) {
        let mut locks = self.locks();
        if locks
            .get(wallet)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(wallet);
        }
    }
}

#[derive(Debug, Error)]
pub enum WellnessError {
    #[error("Wellness record for {0} was modified concurrently")]
    PersistenceConflict(Address),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}
