//! Detection-rate color scale.
//!
//! A fixed 9-stop sequential ramp (ColorBrewer YlGnBu, light to dark,
//! colorblind-safe) sampled with CIE Lab interpolation between the two
//! bracketing stops. Interpolating in Lab rather than raw sRGB avoids the
//! banding and hue drift that a naive channel lerp produces between stops.
//!
//! The same stop table backs both the per-point colors and the legend
//! swatches; see [`crate::services::legend`].

use std::fmt;

/// Number of stops in a ramp.
pub const RAMP_STOPS: usize = 9;

/// sRGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Error returned when a hex color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid hex color: {0:?}")]
pub struct InvalidHexColor(pub String);

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rrggbb` string. The leading `#` is required; hex digits are
    /// case-insensitive.
    pub fn from_hex(s: &str) -> Result<Self, InvalidHexColor> {
        let digits = s
            .strip_prefix('#')
            .ok_or_else(|| InvalidHexColor(s.to_string()))?;
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(InvalidHexColor(s.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| InvalidHexColor(s.to_string()))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Format as lowercase `#rrggbb`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

// ─── sRGB <-> CIE Lab (D65) ────────────────────────────────────────────

/// CIE Lab coordinates, D65 white point.
#[derive(Debug, Clone, Copy)]
struct Lab {
    l: f64,
    a: f64,
    b: f64,
}

const D65_XN: f64 = 95.047;
const D65_YN: f64 = 100.0;
const D65_ZN: f64 = 108.883;

/// Decode an 8-bit sRGB channel to linear light (IEC 61966-2-1).
fn srgb_channel_to_linear(c: u8) -> f64 {
    let c = c as f64 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Encode linear light back to an 8-bit sRGB channel.
fn linear_channel_to_srgb(l: f64) -> u8 {
    let l = l.clamp(0.0, 1.0);
    let c = if l <= 0.003_130_8 {
        12.92 * l
    } else {
        1.055 * l.powf(1.0 / 2.4) - 0.055
    };
    (c * 255.0 + 0.5).floor() as u8
}

fn lab_forward(t: f64) -> f64 {
    // (6/29)^3 threshold per the CIE definition
    if t > 0.008856 {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

fn lab_inverse(t: f64) -> f64 {
    const DELTA: f64 = 6.0 / 29.0;
    if t > DELTA {
        t * t * t
    } else {
        3.0 * DELTA * DELTA * (t - 4.0 / 29.0)
    }
}

fn rgb_to_lab(c: Rgb) -> Lab {
    let r = srgb_channel_to_linear(c.r);
    let g = srgb_channel_to_linear(c.g);
    let b = srgb_channel_to_linear(c.b);

    let x = (0.412_456_4 * r + 0.357_576_1 * g + 0.180_437_5 * b) * 100.0;
    let y = (0.212_672_9 * r + 0.715_152_2 * g + 0.072_175_0 * b) * 100.0;
    let z = (0.019_333_9 * r + 0.119_192_0 * g + 0.950_304_1 * b) * 100.0;

    let fx = lab_forward(x / D65_XN);
    let fy = lab_forward(y / D65_YN);
    let fz = lab_forward(z / D65_ZN);

    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

fn lab_to_rgb(lab: Lab) -> Rgb {
    let fy = (lab.l + 16.0) / 116.0;
    let fx = fy + lab.a / 500.0;
    let fz = fy - lab.b / 200.0;

    let x = lab_inverse(fx) * D65_XN / 100.0;
    let y = lab_inverse(fy) * D65_YN / 100.0;
    let z = lab_inverse(fz) * D65_ZN / 100.0;

    let r = 3.240_454_2 * x - 1.537_138_5 * y - 0.498_531_4 * z;
    let g = -0.969_266_0 * x + 1.876_010_8 * y + 0.041_556_0 * z;
    let b = 0.055_643_4 * x - 0.204_025_9 * y + 1.057_225_2 * z;

    Rgb {
        r: linear_channel_to_srgb(r),
        g: linear_channel_to_srgb(g),
        b: linear_channel_to_srgb(b),
    }
}

// ─── Ramp sampling ─────────────────────────────────────────────────────

/// A sequential color ramp sampled with Lab-space interpolation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorRamp {
    stops: [Rgb; RAMP_STOPS],
}

impl ColorRamp {
    pub const fn new(stops: [Rgb; RAMP_STOPS]) -> Self {
        Self { stops }
    }

    /// The stop at `index` (0 = lightest, 8 = darkest).
    pub fn stop(&self, index: usize) -> Rgb {
        self.stops[index]
    }

    /// All stops, light to dark.
    pub fn stops(&self) -> &[Rgb; RAMP_STOPS] {
        &self.stops
    }

    /// Sample the ramp at `t` in `[0, 1]` (clamped; NaN samples the light
    /// end). Positions landing exactly on a stop return that stop verbatim;
    /// in between, the two bracketing stops are interpolated in Lab space.
    pub fn sample(&self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let scaled = t * (RAMP_STOPS - 1) as f64;
        let lo = (scaled.floor() as usize).min(RAMP_STOPS - 2);
        let frac = scaled - lo as f64;
        if frac <= 0.0 {
            return self.stops[lo];
        }
        if frac >= 1.0 {
            return self.stops[lo + 1];
        }

        let a = rgb_to_lab(self.stops[lo]);
        let b = rgb_to_lab(self.stops[lo + 1]);
        lab_to_rgb(Lab {
            l: a.l + (b.l - a.l) * frac,
            a: a.a + (b.a - a.a) * frac,
            b: a.b + (b.b - a.b) * frac,
        })
    }

    /// Map a detection rate to a ramp color.
    ///
    /// A rate of zero or below (NaN included) always renders as the lightest
    /// stop, independent of the domain, so "no detections" looks identical
    /// everywhere on the map. Positive rates are normalized against
    /// `domain_max` and clamped at the dark end; rates above a stale maximum
    /// degrade to the darkest color rather than sampling out of range. With
    /// no usable maximum the mid-ramp color is used, trading discrimination
    /// for totality.
    pub fn rate_color(&self, rate: f64, domain_max: Option<f64>) -> Rgb {
        if !(rate > 0.0) {
            return self.stops[0];
        }
        let t = match domain_max {
            Some(max) if max > 0.0 => (rate / max).min(1.0),
            _ => 0.5,
        };
        self.sample(t)
    }
}

/// ColorBrewer 9-class YlGnBu, light to dark. Shared by the point colors and
/// the legend swatches; keep it the only palette table in the crate.
pub const YLGNBU: ColorRamp = ColorRamp::new([
    Rgb::new(0xff, 0xff, 0xd9),
    Rgb::new(0xed, 0xf8, 0xb1),
    Rgb::new(0xc7, 0xe9, 0xb4),
    Rgb::new(0x7f, 0xcd, 0xbb),
    Rgb::new(0x41, 0xb6, 0xc4),
    Rgb::new(0x1d, 0x91, 0xc0),
    Rgb::new(0x22, 0x5e, 0xa8),
    Rgb::new(0x25, 0x34, 0x94),
    Rgb::new(0x08, 0x1d, 0x58),
]);

/// Map a detection rate (detections per 100 trap-days) to a `#rrggbb` color
/// on the built-in ramp. See [`ColorRamp::rate_color`] for the exact
/// zero-sentinel, clamp and fallback semantics.
pub fn rate_to_color(rate: f64, domain_max: Option<f64>) -> String {
    YLGNBU.rate_color(rate, domain_max).to_hex()
}
