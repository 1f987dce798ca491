use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a borehole, shared by collars, surveys and datasets
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HoleId(pub String);

impl HoleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HoleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for HoleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Surface location where a borehole begins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collar {
    pub hole_id: HoleId,

    /// Easting, northing, elevation
    pub coordinates: [f64; 3],
}

impl Collar {
    pub fn new(hole_id: impl Into<HoleId>, coordinates: [f64; 3]) -> Self {
        Self { hole_id: hole_id.into(), coordinates }
    }
}

/// Orientation measurement at one distance along the hole
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurveyStation {
    /// Distance along the hole from the collar
    pub distance: f64,

    /// Compass bearing in degrees, clockwise from north
    pub azimuth: f64,

    /// Inclination from horizontal in degrees; negative points down
    pub dip: f64,
}

impl SurveyStation {
    pub fn new(distance: f64, azimuth: f64, dip: f64) -> Self {
        Self { distance, azimuth, dip }
    }
}

/// From/to depth pair of an interval row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthRange {
    pub from: f64,
    pub to: f64,
}

impl DepthRange {
    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }

    /// True when either bound is NaN
    pub fn has_nan(&self) -> bool {
        self.from.is_nan() || self.to.is_nan()
    }

    pub fn length(&self) -> f64 {
        self.to - self.from
    }
}

impl From<(f64, f64)> for DepthRange {
    fn from((from, to): (f64, f64)) -> Self {
        Self { from, to }
    }
}

impl From<[f64; 2]> for DepthRange {
    fn from([from, to]: [f64; 2]) -> Self {
        Self { from, to }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hole_id_ordering() {
        let mut ids = vec![HoleId::from("TU010"), HoleId::from("TU002"), HoleId::from("AB001")];
        ids.sort();
        assert_eq!(ids[0].as_str(), "AB001");
        assert_eq!(ids[2].to_string(), "TU010");
    }

    #[test]
    fn test_hole_id_serializes_as_string() {
        let json = serde_json::to_string(&HoleId::from("H1")).unwrap();
        assert_eq!(json, "\"H1\"");
    }

    #[test]
    fn test_depth_range_nan() {
        assert!(DepthRange::new(f64::NAN, 1.0).has_nan());
        assert!(DepthRange::new(1.0, f64::NAN).has_nan());
        assert!(!DepthRange::from((0.0, 10.0)).has_nan());
        assert_eq!(DepthRange::from([2.0, 5.0]).length(), 3.0);
    }
}
