//! Daily capacity and mixing rules for a generation run.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::model::MtrFilter;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityConfig {
    pub shops_per_day: usize,
    pub groups_per_day: usize,
    pub cross_region: bool,
    pub mtr: MtrFilter,
    /// Dates with no capacity at all (operational closures).
    pub closures: BTreeSet<NaiveDate>,
    /// Per-date limits that replace `shops_per_day`.
    pub overrides: BTreeMap<NaiveDate, usize>,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            shops_per_day: 20,
            groups_per_day: 3,
            cross_region: true,
            mtr: MtrFilter::None,
            closures: BTreeSet::new(),
            overrides: BTreeMap::new(),
        }
    }
}

impl CapacityConfig {
    pub fn per_day(shops_per_day: usize) -> Self {
        Self {
            shops_per_day,
            ..Self::default()
        }
    }
}

/// Static per-run capacity answers derived from a [`CapacityConfig`].
#[derive(Debug, Clone)]
pub struct CapacityPolicy {
    config: CapacityConfig,
}

impl CapacityPolicy {
    pub fn new(config: CapacityConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.config.shops_per_day == 0 {
            return Err(ConfigurationError::new("shops per day must be at least 1"));
        }
        if self.config.groups_per_day == 0 {
            return Err(ConfigurationError::new("groups per day must be at least 1"));
        }
        Ok(())
    }

    /// Maximum shops schedulable on `date`; zero means the date is unusable.
    pub fn limit_for(&self, date: NaiveDate) -> usize {
        if self.config.closures.contains(&date) {
            return 0;
        }
        self.config
            .overrides
            .get(&date)
            .copied()
            .unwrap_or(self.config.shops_per_day)
    }

    pub fn cross_region_allowed(&self) -> bool {
        self.config.cross_region
    }

    pub fn mtr_filter(&self) -> MtrFilter {
        self.config.mtr
    }

    pub fn groups_per_day(&self) -> usize {
        self.config.groups_per_day
    }
}
