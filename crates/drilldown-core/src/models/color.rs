use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Color with fractional (0-1) red, green and blue components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgb(pub [f64; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0.0, 0.0, 0.0]);
    pub const WHITE: Rgb = Rgb([1.0, 1.0, 1.0]);

    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self([r, g, b])
    }

    /// Build from 8-bit components
    pub fn from_bytes(r: u8, g: u8, b: u8) -> Self {
        Self([r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0])
    }

    /// Parse `#rrggbb` (leading `#` optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::from_bytes(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.0.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    /// Perceptually weighted distance between two colors
    ///
    /// Uses the "redmean" weighting, which tracks human perception better than
    /// a plain euclidean distance in RGB space.
    pub fn distance(&self, other: &Rgb) -> f64 {
        let [r1, g1, b1] = self.0.map(|c| c * 255.0);
        let [r2, g2, b2] = other.0.map(|c| c * 255.0);
        let mean_r = (r1 + r2) / 2.0;
        let (dr, dg, db) = (r1 - r2, g1 - g2, b1 - b2);

        ((2.0 + mean_r / 256.0) * dr * dr
            + 4.0 * dg * dg
            + (2.0 + (255.0 - mean_r) / 256.0) * db * db)
            .sqrt()
    }
}

/// Strategy used to fill in colors for categories without one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Round-robin through the base palette
    #[default]
    Cycle,
    /// Ask the color generator for maximally distinct colors
    Distinct,
}

/// A user supplied color in any accepted format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Numeric triple, fractional (0-1) or 8-bit (0-255)
    Triple([f64; 3]),
    /// `#rrggbb` hex string or a known color name
    Name(String),
}

impl ColorSpec {
    /// Resolve to a fractional color.
    ///
    /// A triple with any component above 1 is read as 8-bit.
    pub fn to_rgb(&self) -> std::result::Result<Rgb, String> {
        match self {
            ColorSpec::Triple(components) => {
                if components.iter().any(|c| !c.is_finite() || *c < 0.0) {
                    return Err(format!(
                        "components must be finite and non-negative: {:?}",
                        components
                    ));
                }
                if components.iter().all(|c| *c <= 1.0) {
                    Ok(Rgb(*components))
                } else if components.iter().all(|c| *c <= 255.0) {
                    Ok(Rgb(components.map(|c| c / 255.0)))
                } else {
                    Err(format!("components must be within 0-1 or 0-255: {:?}", components))
                }
            }
            ColorSpec::Name(name) if name.starts_with('#') => {
                Rgb::from_hex(name).ok_or_else(|| format!("malformed hex color '{}'", name))
            }
            ColorSpec::Name(name) => {
                named_color(name).ok_or_else(|| format!("unknown color name '{}'", name))
            }
        }
    }
}

impl From<Rgb> for ColorSpec {
    fn from(color: Rgb) -> Self {
        ColorSpec::Triple(color.0)
    }
}

impl From<&str> for ColorSpec {
    fn from(name: &str) -> Self {
        ColorSpec::Name(name.to_string())
    }
}

/// Category -> color assignments supplied by the caller
pub type ColorOverrides = BTreeMap<String, ColorSpec>;

/// Base palette used by [`ColorMode::Cycle`]
pub const BASE_PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Look up a color by name (case-insensitive)
pub fn named_color(name: &str) -> Option<Rgb> {
    let name = name.trim().to_lowercase();
    let hex = match name.as_str() {
        "black" | "k" => "#000000",
        "white" | "w" => "#ffffff",
        "red" | "r" => "#ff0000",
        "green" | "g" => "#008000",
        "blue" | "b" => "#0000ff",
        "cyan" | "c" => "#00ffff",
        "magenta" | "m" => "#ff00ff",
        "yellow" | "y" => "#ffff00",
        "gray" | "grey" => "#808080",
        "orange" => "#ffa500",
        "purple" => "#800080",
        "brown" => "#a52a2a",
        "pink" => "#ffc0cb",
        "olive" => "#808000",
        "navy" => "#000080",
        "teal" => "#008080",
        "gold" => "#ffd700",
        _ => {
            // "tab:blue" style and "C0".."C9" palette references
            let index = match name.strip_prefix("tab:") {
                Some("blue") => Some(0),
                Some("orange") => Some(1),
                Some("green") => Some(2),
                Some("red") => Some(3),
                Some("purple") => Some(4),
                Some("brown") => Some(5),
                Some("pink") => Some(6),
                Some("gray") | Some("grey") => Some(7),
                Some("olive") => Some(8),
                Some("cyan") => Some(9),
                Some(_) => None,
                None => name.strip_prefix('c').and_then(|i| i.parse::<usize>().ok()),
            }?;
            return Rgb::from_hex(BASE_PALETTE.get(index)?);
        }
    };
    Rgb::from_hex(hex)
}
