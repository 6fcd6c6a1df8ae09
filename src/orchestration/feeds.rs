use crate::db::Repository;
use crate::domain::{Address, FeedKind, FeedRecord, FeedStatus, NewFeed, TimeMs};
use crate::engine::MIN_INTERVAL_SECS;
use crate::orchestration::wellness::WellnessService;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Feed mutations, each followed by an on-demand wellness recompute.
pub struct FeedService {
    repo: Arc<Repository>,
    wellness: Arc<WellnessService>,
}

impl FeedService {
    pub fn new(repo: Arc<Repository>, wellness: Arc<WellnessService>) -> Self {
        Self { repo, wellness }
    }

    pub async fn create(&self, feed: &NewFeed, now: TimeMs) -> Result<FeedRecord, FeedError> {
        validate_new_feed(feed)?;
        let record = self.repo.insert_feed(feed, now).await?;
        info!(
            wallet = %record.wallet,
            feed_id = record.id,
            kind = %record.kind,
            "Feed created"
        );
        self.refresh_wellness(&record.wallet, now).await;
        Ok(record)
    }

    /// Move a feed to `next`, enforcing the lifecycle state machine.
    pub async fn transition(
        &self,
        id: i64,
        next: FeedStatus,
        now: TimeMs,
    ) -> Result<FeedRecord, FeedError> {
        let mut feed = self
            .repo
            .get_feed(id)
            .await?
            .ok_or(FeedError::NotFound(id))?;

        if !feed.status.can_transition_to(next) {
            return Err(FeedError::InvalidTransition {
                from: feed.status,
                to: next,
            });
        }
        if feed.status == next {
            // Re-applied status: nothing to write, but a previous attempt may
            // have committed without refreshing wellness.
            self.refresh_wellness(&feed.wallet, now).await;
            return Ok(feed);
        }

        if !self.repo.update_feed_status(id, feed.status, next).await? {
            return Err(FeedError::Conflict(id));
        }
        info!(feed_id = id, from = %feed.status, to = %next, "Feed status changed");
        feed.status = next;

        self.refresh_wellness(&feed.wallet, now).await;
        Ok(feed)
    }

    /// Count one execution by the bot.
    pub async fn record_execution(
        &self,
        id: i64,
        next_fill_time: Option<TimeMs>,
        now: TimeMs,
    ) -> Result<FeedRecord, FeedError> {
        let feed = self
            .repo
            .get_feed(id)
            .await?
            .ok_or(FeedError::NotFound(id))?;
        if feed.status.is_terminal() {
            return Err(FeedError::Terminal(id));
        }
        if !self.repo.record_execution(id, next_fill_time).await? {
            return Err(FeedError::Conflict(id));
        }

        let feed = self
            .repo
            .get_feed(id)
            .await?
            .ok_or(FeedError::NotFound(id))?;
        self.refresh_wellness(&feed.wallet, now).await;
        Ok(feed)
    }

    /// Recompute after a committed mutation. The mutation stands even if
    /// this fails; the next trigger or sweep brings the record up to date.
    async fn refresh_wellness(&self, wallet: &Address, now: TimeMs) {
        if let Err(e) = self.wellness.recompute(wallet, now).await {
            warn!(wallet = %wallet, error = %e, "Wellness refresh after feed change failed");
        }
    }
}

fn validate_new_feed(feed: &NewFeed) -> Result<(), FeedError> {
    if !feed.chunk_size.is_positive() {
        return Err(FeedError::Validation("chunk size must be positive".into()));
    }
    match feed.kind {
        FeedKind::Recurring if feed.period_secs < MIN_INTERVAL_SECS => {
            Err(FeedError::Validation(format!(
                "recurring period must be at least {} seconds",
                MIN_INTERVAL_SECS
            )))
        }
        FeedKind::OneOff if feed.period_secs < 0 => {
            Err(FeedError::Validation("period must not be negative".into()))
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Feed {0} not found")]
    NotFound(i64),
    #[error("Invalid feed: {0}")]
    Validation(String),
    #[error("Cannot move feed from {from} to {to}")]
    InvalidTransition { from: FeedStatus, to: FeedStatus },
    #[error("Feed {0} is already finished")]
    Terminal(i64),
    #[error("Feed {0} was modified concurrently")]
    Conflict(i64),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}
