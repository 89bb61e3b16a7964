//! Service layer for business logic and orchestration.
//!
//! Services sit between the (external) API layer and the DTOs and implement
//! the data processing for each visualization.

pub mod detection_map;

pub mod legend;

pub use detection_map::{compute_detection_map_data, compute_rate_domain, to_feature_collection};
pub use legend::{build_legend, build_legend_with};
