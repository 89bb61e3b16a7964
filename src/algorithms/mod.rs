//! Numeric and color-space algorithms backing the visualization services.

pub mod color_scale;
