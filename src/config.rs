//! Planner settings snapshot, read once per run.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::calendar::CalendarConfig;
use crate::capacity::CapacityConfig;
use crate::engine::GenerateRequest;
use crate::error::PlannerError;
use crate::sequencer::SequencerOptions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    pub calendar: CalendarConfig,
    pub capacity: CapacityConfig,
    pub sequencer: SequencerOptions,
    /// Default bound on day plans per run.
    pub max_days: usize,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            calendar: CalendarConfig::default(),
            capacity: CapacityConfig::default(),
            sequencer: SequencerOptions::default(),
            max_days: 60,
        }
    }
}

impl PlannerSettings {
    pub fn from_json_str(json: &str) -> Result<Self, PlannerError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PlannerError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Capacity defaults with the request's overrides applied.
    pub fn capacity_for(&self, request: &GenerateRequest) -> CapacityConfig {
        let mut capacity = self.capacity.clone();
        if let Some(shops_per_day) = request.shops_per_day {
            capacity.shops_per_day = shops_per_day;
        }
        if let Some(cross_region) = request.cross_region {
            capacity.cross_region = cross_region;
        }
        if let Some(mtr) = request.mtr {
            capacity.mtr = mtr;
        }
        capacity
    }
}
