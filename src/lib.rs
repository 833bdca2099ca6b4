//! stocktake-planner
//!
//! Schedules stock-take visits to Hong Kong and Macau shops over business
//! days, then orders each day's visits into a short route.

pub mod model;
pub mod error;
pub mod traits;
pub mod calendar;
pub mod capacity;
pub mod pool;
pub mod engine;
pub mod sequencer;
pub mod haversine;
pub mod amap;
pub mod config;
pub mod store;
pub mod planner;

pub use error::{ConfigurationError, ConflictError, DistanceUnavailable, PlannerError};
pub use planner::{GenerationReport, PlannedSchedule, SchedulePreview, StockTakePlanner};
