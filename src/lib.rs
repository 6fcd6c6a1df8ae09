pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod quote;

pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{
    Address, Decimal, FeedKind, FeedRecord, FeedStatus, NewFeed, TimeMs, WellnessEvent,
    WellnessReason, WellnessRecord,
};
pub use engine::{
    assemble_twap_descriptor, compute_schedule_parameters, recompute_wellness, Routing,
    RoutingMode, ScheduleError, ScheduleIntent, ScheduleParameters, StopCondition,
    TwapDescriptor,
};
pub use error::AppError;
pub use quote::{HttpQuoteProvider, MockQuoteProvider, QuoteError, QuoteProvider};
