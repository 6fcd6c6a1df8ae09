//! Domain types for DCA feeds and the wellness score.
//!
//! This module provides:
//! - Lossless numeric handling via Decimal wrapper
//! - Domain primitives: TimeMs, Address
//! - Feed/order records with their lifecycle state machine
//! - Wellness record and event history types

pub mod decimal;
pub mod feed;
pub mod primitives;
pub mod wellness;

pub use decimal::Decimal;
pub use feed::{FeedKind, FeedRecord, FeedStatus, NewFeed};
pub use primitives::{Address, AddressParseError, TimeMs};
pub use wellness::{WellnessEvent, WellnessReason, WellnessRecord};
