//! Error taxonomy for planning runs and schedule storage.

use chrono::NaiveDate;

use crate::model::{ShopId, ShopStatus};

/// Calendar or capacity settings that cannot produce a usable date.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("configuration error: {0}")]
pub struct ConfigurationError(pub String);

impl ConfigurationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// The store already holds an active entry for a shop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("shop {shop_id} already has an active schedule entry on {existing_date}")]
pub struct ConflictError {
    pub shop_id: ShopId,
    pub existing_date: NaiveDate,
}

/// A routing estimate could not be obtained for a pair of points.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("distance unavailable: {reason}")]
pub struct DistanceUnavailable {
    pub reason: String,
}

impl DistanceUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    #[error("unknown shop {0}")]
    UnknownShop(ShopId),
    #[error("shop {shop_id} cannot be moved to {date}: not a business day with capacity")]
    IneligibleDate { shop_id: ShopId, date: NaiveDate },
    #[error("shop {shop_id} has no active schedule entry")]
    NotScheduled { shop_id: ShopId },
    #[error("shop {shop_id} cannot move from {from} to {to}")]
    InvalidTransition {
        shop_id: ShopId,
        from: ShopStatus,
        to: ShopStatus,
    },
    #[error("unknown region {0:?}")]
    UnknownRegion(String),
    #[error("unknown status {0:?}")]
    UnknownStatus(String),
    #[error("invalid shop record at row {row}: {reason}")]
    InvalidRecord { row: usize, reason: String },
    #[error("settings parse error: {0}")]
    Settings(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
