//! Color Utilities
//!
//! RGB colors as used by the semaphore scales. Colors arrive from configuration
//! as hex strings (`#1a9641`, `#fc0`), `rgb(r, g, b)` strings, CSS names or raw
//! `[r, g, b]` triples; everything is normalized to [`Rgb`] at the boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while parsing a color specification
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("Invalid hex color '{0}' (expected #RRGGBB or #RGB)")]
    InvalidHex(String),

    #[error("Invalid rgb() color '{0}'")]
    InvalidRgb(String),

    #[error("Unknown color name '{0}'")]
    UnknownName(String),
}

/// 8-bit RGB color
///
/// Serializes as a lowercase `#rrggbb` string so report JSON can be fed
/// straight into chart libraries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "ColorSpec")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Raw color as written in configuration files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Triple([u8; 3]),
    Text(String),
}

/// Gray used for missing or invalid measurements.
pub const NO_DATA_COLOR: Rgb = Rgb::new(128, 128, 128);

/// Supported CSS color names (the subset the semaphore tables use)
const NAMED_COLORS: &[(&str, Rgb)] = &[
    ("green", Rgb::new(0, 128, 0)),
    ("darkgreen", Rgb::new(0, 100, 0)),
    ("limegreen", Rgb::new(50, 205, 50)),
    ("lightgreen", Rgb::new(144, 238, 144)),
    ("yellow", Rgb::new(255, 255, 0)),
    ("gold", Rgb::new(255, 215, 0)),
    ("orange", Rgb::new(255, 165, 0)),
    ("darkorange", Rgb::new(255, 140, 0)),
    ("red", Rgb::new(255, 0, 0)),
    ("darkred", Rgb::new(139, 0, 0)),
    ("gray", Rgb::new(128, 128, 128)),
    ("grey", Rgb::new(128, 128, 128)),
    ("lightgray", Rgb::new(211, 211, 211)),
    ("white", Rgb::new(255, 255, 255)),
    ("black", Rgb::new(0, 0, 0)),
];

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Look up a CSS color name (case-insensitive)
    pub fn named(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, rgb)| *rgb)
    }

    /// Parse `#RRGGBB` or `#RGB`
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let err = || ColorError::InvalidHex(hex.to_string());
        let digits = hex.trim().strip_prefix('#').ok_or_else(err)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }

        match digits.len() {
            6 => {
                let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| err());
                Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
            }
            3 => {
                // #abc expands to #aabbcc
                let channel = |i: usize| {
                    u8::from_str_radix(&digits[i..i + 1], 16)
                        .map(|v| v * 17)
                        .map_err(|_| err())
                };
                Ok(Self::new(channel(0)?, channel(1)?, channel(2)?))
            }
            _ => Err(err()),
        }
    }

    /// Lowercase `#rrggbb` encoding
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Parse `rgb(r, g, b)` with integer channels 0-255
    fn from_rgb_function(text: &str) -> Result<Self, ColorError> {
        let err = || ColorError::InvalidRgb(text.to_string());
        let inner = text
            .trim()
            .strip_prefix("rgb(")
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(err)?;

        let parts: Vec<u8> = inner
            .split(',')
            .map(|p| p.trim().parse::<u8>().map_err(|_| err()))
            .collect::<Result<_, _>>()?;

        match parts.as_slice() {
            [r, g, b] => Ok(Self::new(*r, *g, *b)),
            _ => Err(err()),
        }
    }
}

impl FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with('#') {
            Self::from_hex(trimmed)
        } else if trimmed.to_ascii_lowercase().starts_with("rgb(") {
            Self::from_rgb_function(&trimmed.to_ascii_lowercase())
        } else {
            Self::named(trimmed).ok_or_else(|| ColorError::UnknownName(trimmed.to_string()))
        }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl TryFrom<ColorSpec> for Rgb {
    type Error = ColorError;

    fn try_from(spec: ColorSpec) -> Result<Self, Self::Error> {
        match spec {
            ColorSpec::Triple(channels) => Ok(channels.into()),
            ColorSpec::Text(text) => text.parse(),
        }
    }
}

impl From<Rgb> for String {
    fn from(rgb: Rgb) -> Self {
        rgb.to_hex()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Linear per-channel interpolation between two colors
///
/// `channel = a + (b - a) * ratio`, rounded to the nearest integer.
/// Ratios outside [0, 1] are clamped; NaN is treated as 0.
pub fn interpolate(a: Rgb, b: Rgb, ratio: f64) -> Rgb {
    if a == b {
        return a;
    }

    let ratio = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };
    let mix = |ca: u8, cb: u8| -> u8 {
        let v = f64::from(ca) + (f64::from(cb) - f64::from(ca)) * ratio;
        v.round().clamp(0.0, 255.0) as u8
    };

    Rgb::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b))
}

/// Interpolate between two colors given as configuration strings
pub fn interpolate_str(a: &str, b: &str, ratio: f64) -> Result<Rgb, ColorError> {
    Ok(interpolate(a.parse()?, b.parse()?, ratio))
}
