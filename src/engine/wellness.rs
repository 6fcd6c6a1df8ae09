//! Wellness recompute: a full fold over a wallet's feed records.
//!
//! Every call rebuilds the score and the history from a fixed baseline.
//! Nothing is applied incrementally, so out-of-band status flips or
//! execution-count bumps by the bot can never drift from the stored value.

use crate::domain::{
    Address, Decimal, FeedKind, FeedRecord, FeedStatus, TimeMs, WellnessEvent, WellnessReason,
    WellnessRecord,
};

/// Length of one inactivity decay step.
pub const DECAY_INTERVAL_MS: i64 = 6 * 60 * 60 * 1000;

fn baseline() -> Decimal {
    Decimal::from(8)
}

fn max_wellness() -> Decimal {
    Decimal::from(10)
}

fn half() -> Decimal {
    Decimal::from_parts(5, 1)
}

fn one() -> Decimal {
    Decimal::from(1)
}

/// Accumulates events and the latest activity time while folding feeds.
struct Fold {
    wellness: Decimal,
    last_activity: TimeMs,
    events: Vec<WellnessEvent>,
}

impl Fold {
    fn push(&mut self, timestamp: TimeMs, delta: Decimal, reason: WellnessReason, detail: &str) {
        self.wellness += delta;
        self.events.push(WellnessEvent {
            timestamp,
            delta,
            reason,
            detail: detail.to_string(),
        });
    }

    fn touch(&mut self, at: TimeMs) {
        self.last_activity = self.last_activity.max(at);
    }

    fn fold_feed(&mut self, feed: &FeedRecord) {
        let detail = feed.pair_label();

        let (delta, reason) = match feed.kind {
            FeedKind::OneOff => (one(), WellnessReason::InstantTrade),
            FeedKind::Recurring => (half(), WellnessReason::RecurringCreated),
        };
        self.push(feed.created_at, delta, reason, &detail);
        self.touch(feed.created_at);

        // Only the count is stored; slot times are reconstructed from the cadence.
        let period_ms = feed.period_secs.saturating_mul(1000);
        for i in 0..i64::from(feed.bot_execution_count) {
            let at = feed.created_at.plus_ms(i.saturating_mul(period_ms));
            self.push(at, half(), WellnessReason::CycleExecuted, &detail);
            self.touch(at);
        }

        match feed.status {
            FeedStatus::Completed => {
                self.push(
                    feed.created_at,
                    one(),
                    WellnessReason::ScheduleCompleted,
                    &detail,
                );
            }
            FeedStatus::Failed => {
                self.push(
                    feed.created_at,
                    -one(),
                    WellnessReason::ScheduleFailed,
                    &detail,
                );
            }
            FeedStatus::Active | FeedStatus::Executing | FeedStatus::Cancelled => {}
        }
    }

    fn apply_decay(&mut self, now: TimeMs) {
        let idle_ms = now.as_ms().saturating_sub(self.last_activity.as_ms());
        if idle_ms <= 0 {
            return;
        }
        let cycles = idle_ms / DECAY_INTERVAL_MS;
        for k in 0..cycles {
            let at = self
                .last_activity
                .plus_ms((k + 1).saturating_mul(DECAY_INTERVAL_MS));
            self.push(at, -half(), WellnessReason::InactivityDecay, "");
        }
    }
}

/// Recompute the wellness record for `wallet` from every feed it owns.
///
/// `feeds` may arrive in any order: the final score and `last_fed_time`
/// are order-independent and the history is sorted deterministically.
pub fn recompute_wellness(
    wallet: &Address,
    feeds: &[FeedRecord],
    existing: Option<&WellnessRecord>,
    now: TimeMs,
) -> WellnessRecord {
    let mut fold = Fold {
        wellness: baseline(),
        last_activity: existing.map(|r| r.last_fed_time).unwrap_or(now),
        events: Vec::new(),
    };

    for feed in feeds {
        fold.fold_feed(feed);
    }
    fold.apply_decay(now);

    let current_wellness = fold.wellness.clamp_to(Decimal::zero(), max_wellness());

    let mut history = fold.events;
    history.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| a.reason.cmp(&b.reason))
            .then_with(|| a.detail.cmp(&b.detail))
            .then_with(|| a.delta.cmp(&b.delta))
    });

    WellnessRecord {
        wallet: wallet.clone(),
        current_wellness,
        last_fed_time: fold.last_activity,
        last_recomputed_at: now,
        history,
    }
}
