//! Map legend construction.
//!
//! The legend mirrors the ramp and breakpoints used for the point colors so
//! a rendered point and the swatch of the band containing its rate are
//! indistinguishable. Both sides read the same stop table; there is no
//! second palette to drift out of sync.

use crate::algorithms::color_scale::{ColorRamp, YLGNBU};
use crate::api::{LegendEntry, RateDomain};

// Ramp stops backing the three positive bands. They sit at sample positions
// t = 0.25, 0.625 and 1.0, so every swatch is an exact mapper output.
const LOW_BAND_STOP: usize = 2;
const MID_BAND_STOP: usize = 5;
const HIGH_BAND_STOP: usize = 8;

/// Build the map legend for a computed rate domain using the built-in ramp.
///
/// The first entry is always the zero swatch. A degenerate domain produces
/// only that entry: a legend with just "0" is how "no detections recorded in
/// this view" reads in the UI. Otherwise three band entries follow, labelled
/// `[min, p33]`, `[p33, p66]` and `[p66, max]` to one decimal place.
pub fn build_legend(domain: &RateDomain) -> Vec<LegendEntry> {
    build_legend_with(&YLGNBU, domain)
}

/// Build the map legend against a specific ramp (configuration override path).
pub fn build_legend_with(ramp: &ColorRamp, domain: &RateDomain) -> Vec<LegendEntry> {
    let mut entries = vec![LegendEntry {
        color: ramp.stop(0).to_hex(),
        label: "0".to_string(),
    }];

    if !domain.is_informative() {
        return entries;
    }

    let bands = [
        (domain.min, domain.p33, LOW_BAND_STOP),
        (domain.p33, domain.p66, MID_BAND_STOP),
        (domain.p66, domain.max, HIGH_BAND_STOP),
    ];
    for (lo, hi, stop) in bands {
        entries.push(LegendEntry {
            color: ramp.stop(stop).to_hex(),
            label: format!("{:.1} - {:.1}", lo, hi),
        });
    }

    entries
}
