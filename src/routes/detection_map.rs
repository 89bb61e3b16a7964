use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::DeploymentPeriod;

/// Calibration domain for the detection-rate color scale.
///
/// Computed from the strictly-positive rates of a deployment collection.
/// All four fields are zero when no positive rate exists; callers branch on
/// [`RateDomain::is_informative`] before using the breakpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateDomain {
    pub min: f64,
    pub max: f64,
    pub p33: f64,
    pub p66: f64,
}

impl RateDomain {
    /// The "no variation to display" sentinel.
    pub const ZERO: Self = Self {
        min: 0.0,
        max: 0.0,
        p33: 0.0,
        p66: 0.0,
    };

    /// Whether any positive rate contributed to this domain.
    pub fn is_informative(&self) -> bool {
        self.max > 0.0
    }
}

/// Legend swatch color plus human-readable range label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub color: String,
    pub label: String,
}

/// Minimal deployment data for map rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentPoint {
    pub deployment_id: String, // External ID from the API layer (shown to user)
    pub site_name: String,
    pub longitude: f64,
    pub latitude: f64,
    /// Detections per 100 trap-days, precomputed by the statistics layer
    pub detection_rate: f64,
    pub detections: u64,
    pub rate_band: String,
    pub color: String,
    pub period: Option<DeploymentPeriod>,
}

/// Detection map visualization data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionMapData {
    pub points: Vec<DeploymentPoint>,
    pub legend: Vec<LegendEntry>,
    pub domain: RateDomain,
    pub rate_min: f64,
    pub rate_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
    pub total_count: usize,
    pub active_count: usize,
    pub survey_start: Option<NaiveDate>,
    pub survey_end: Option<NaiveDate>,
}

/// GeoJSON point geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub geometry_type: String,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
}

/// Identity and resolved style attached to each map feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureProperties {
    pub deployment_id: String,
    pub site_name: String,
    pub detection_rate: f64,
    pub detections: u64,
    pub rate_band: String,
    pub color: String,
}

/// A single GeoJSON feature with its style resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapFeature {
    #[serde(rename = "type")]
    pub feature_type: String,
    pub geometry: PointGeometry,
    pub properties: FeatureProperties,
}

/// GeoJSON feature collection handed to the map widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub collection_type: String,
    pub features: Vec<MapFeature>,
}

/// Route function name constant
pub const GET_DETECTION_MAP_DATA: &str = "get_detection_map_data";
