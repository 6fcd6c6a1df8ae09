//! Feed/order records: one per configured schedule or one-off trade.

use crate::domain::{Address, Decimal, TimeMs};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether the record describes a single trade or a recurring schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedKind {
    OneOff,
    Recurring,
}

impl FeedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::OneOff => "one-off",
            FeedKind::Recurring => "recurring",
        }
    }
}

impl FromStr for FeedKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one-off" => Ok(FeedKind::OneOff),
            "recurring" => Ok(FeedKind::Recurring),
            other => Err(format!("unknown feed kind: {}", other)),
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a feed.
///
/// `Active` and `Executing` flip back and forth while the execution bot
/// works; every other transition is one-way into a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedStatus {
    Active,
    Executing,
    Completed,
    Cancelled,
    Failed,
}

impl FeedStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedStatus::Active => "active",
            FeedStatus::Executing => "executing",
            FeedStatus::Completed => "completed",
            FeedStatus::Cancelled => "cancelled",
            FeedStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FeedStatus::Completed | FeedStatus::Cancelled | FeedStatus::Failed
        )
    }

    /// Whether `self -> next` is a legal move. Re-applying the current
    /// status is accepted as a no-op.
    pub fn can_transition_to(&self, next: FeedStatus) -> bool {
        if *self == next {
            return true;
        }
        match self {
            FeedStatus::Active | FeedStatus::Executing => true,
            FeedStatus::Completed | FeedStatus::Cancelled | FeedStatus::Failed => false,
        }
    }
}

impl FromStr for FeedStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(FeedStatus::Active),
            "executing" => Ok(FeedStatus::Executing),
            "completed" => Ok(FeedStatus::Completed),
            "cancelled" => Ok(FeedStatus::Cancelled),
            "failed" => Ok(FeedStatus::Failed),
            other => Err(format!("unknown feed status: {}", other)),
        }
    }
}

impl fmt::Display for FeedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted feed/order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRecord {
    pub id: i64,
    pub wallet: Address,
    pub kind: FeedKind,
    pub src_token: Address,
    pub dst_token: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst_symbol: Option<String>,
    /// Amount spent per cycle, in source-token units.
    pub chunk_size: Decimal,
    /// Seconds between cycles.
    pub period_secs: i64,
    pub status: FeedStatus,
    pub created_at: TimeMs,
    /// Only ever incremented, and only by the execution bot.
    pub bot_execution_count: u32,
    pub next_fill_time: Option<TimeMs>,
    /// Hash returned by the signing layer on submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_hash: Option<String>,
}

impl FeedRecord {
    /// Human-readable pair label, preferring cached symbols.
    pub fn pair_label(&self) -> String {
        let src = self
            .src_symbol
            .clone()
            .unwrap_or_else(|| self.src_token.to_string());
        let dst = self
            .dst_symbol
            .clone()
            .unwrap_or_else(|| self.dst_token.to_string());
        format!("{} → {}", src, dst)
    }
}

/// Fields supplied when creating a feed; the store assigns the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeed {
    pub wallet: Address,
    pub kind: FeedKind,
    pub src_token: Address,
    pub dst_token: Address,
    #[serde(default)]
    pub src_symbol: Option<String>,
    #[serde(default)]
    pub dst_symbol: Option<String>,
    pub chunk_size: Decimal,
    pub period_secs: i64,
    #[serde(default)]
    pub order_hash: Option<String>,
}
