//! Public API surface for the Rust backend.
//!
//! This file consolidates the DTO types for the visualization layer.
//! All types derive Serialize/Deserialize for JSON serialization.

pub use crate::routes::detection_map::DeploymentPoint;
pub use crate::routes::detection_map::DetectionMapData;
pub use crate::routes::detection_map::FeatureCollection;
pub use crate::routes::detection_map::FeatureProperties;
pub use crate::routes::detection_map::LegendEntry;
pub use crate::routes::detection_map::MapFeature;
pub use crate::routes::detection_map::PointGeometry;
pub use crate::routes::detection_map::RateDomain;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Calendar interval during which a camera deployment was active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentPeriod {
    /// First day the camera was armed
    pub start: NaiveDate,
    /// Last day the camera was armed
    pub end: NaiveDate,
}

impl DeploymentPeriod {
    /// Create a period; `None` when the interval is inverted.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        if start <= end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Number of trap-days covered, inclusive of both endpoints.
    pub fn trap_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Check if a given day lies inside this interval.
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}
