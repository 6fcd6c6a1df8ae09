//! Services that wire the pure engine to the store and the quote provider.

pub mod feeds;
pub mod schedule;
pub mod wellness;

pub use feeds::{FeedError, FeedService};
pub use schedule::{ScheduleRequest, ScheduleService};
pub use wellness::{WellnessError, WellnessService};
