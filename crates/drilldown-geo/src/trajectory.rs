//! Minimum-curvature desurvey of a single hole.

use drilldown_core::config::Interpolation;
use drilldown_core::error::{DrilldownError, Result};
use drilldown_core::models::{HoleId, SurveyStation};
use itertools::Itertools;
use nalgebra::{Point3, Vector3};

/// Doglegs below this angle (radians) are treated as straight
const DOGLEG_EPSILON: f64 = 1e-9;

/// Sine and cosine of an angle in degrees, exact at multiples of 90
fn sin_cos_degrees(degrees: f64) -> (f64, f64) {
    let turn = degrees.rem_euclid(360.0);
    if turn == 0.0 {
        (0.0, 1.0)
    } else if turn == 90.0 {
        (1.0, 0.0)
    } else if turn == 180.0 {
        (0.0, -1.0)
    } else if turn == 270.0 {
        (-1.0, 0.0)
    } else {
        degrees.to_radians().sin_cos()
    }
}

/// Unit direction of a station: x east, y north, z up.
pub fn direction(azimuth: f64, dip: f64) -> Vector3<f64> {
    let (sin_az, cos_az) = sin_cos_degrees(azimuth);
    let (sin_dip, cos_dip) = sin_cos_degrees(dip);
    Vector3::new(cos_dip * sin_az, cos_dip * cos_az, sin_dip)
}

/// Angle between two unit directions, in radians
pub fn dogleg(t1: &Vector3<f64>, t2: &Vector3<f64>) -> f64 {
    t1.dot(t2).clamp(-1.0, 1.0).acos()
}

/// Ratio factor smoothing the straight average into a constant-curvature arc
pub fn ratio_factor(dogleg: f64) -> f64 {
    if dogleg < DOGLEG_EPSILON {
        1.0
    } else {
        2.0 / dogleg * (dogleg / 2.0).tan()
    }
}

/// Displacement over `length` along-hole between directions `t1` and `t2`
fn displacement(t1: &Vector3<f64>, t2: &Vector3<f64>, length: f64) -> Vector3<f64> {
    (t1 + t2) * (length / 2.0 * ratio_factor(dogleg(t1, t2)))
}

/// Direction a fraction of the way along the arc from `t1` to `t2`
fn slerp_direction(t1: &Vector3<f64>, t2: &Vector3<f64>, fraction: f64) -> Vector3<f64> {
    let beta = dogleg(t1, t2);
    if beta < DOGLEG_EPSILON {
        return *t1;
    }
    (t1 * ((1.0 - fraction) * beta).sin() + t2 * (fraction * beta).sin()) / beta.sin()
}

pub(crate) fn to_array(point: &Point3<f64>) -> [f64; 3] {
    [point.x, point.y, point.z]
}

/// Path of one hole, from its collar through its survey stations
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    hole_id: HoleId,
    collar: Point3<f64>,
    stations: Vec<SurveyStation>,
    directions: Vec<Vector3<f64>>,
    positions: Vec<Point3<f64>>,
    interpolation: Interpolation,
}

impl Trajectory {
    /// Build a trajectory from a collar and survey stations in any order.
    ///
    /// When no station sits at distance 0, the collar takes the orientation of
    /// the shallowest station.
    pub fn new(hole_id: HoleId, collar: [f64; 3], stations: Vec<SurveyStation>) -> Result<Self> {
        let invalid = |reason: String| DrilldownError::InvalidSurvey {
            hole: hole_id.to_string(),
            reason,
        };

        if collar.iter().any(|c| !c.is_finite()) {
            return Err(DrilldownError::InvalidCoordinates {
                hole: hole_id.to_string(),
                reason: format!("collar {:?} is not finite", collar),
            });
        }

        if stations.is_empty() {
            return Err(invalid("no survey stations".to_string()));
        }

        for station in &stations {
            if !station.distance.is_finite() || station.distance < 0.0 {
                return Err(invalid(format!("distance {} is not a finite depth", station.distance)));
            }
            if !station.azimuth.is_finite() || !station.dip.is_finite() {
                return Err(invalid(format!("orientation at {} is not finite", station.distance)));
            }
            if station.dip.abs() > 90.0 {
                return Err(DrilldownError::DipOutOfRange {
                    hole: hole_id.to_string(),
                    dip: station.dip,
                });
            }
        }

        let mut stations = stations;
        stations.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        if let Some((a, _)) =
            stations.iter().tuple_windows().find(|(a, b)| a.distance == b.distance)
        {
            return Err(invalid(format!("duplicate station distance {}", a.distance)));
        }

        if stations[0].distance > 0.0 {
            let top = SurveyStation { distance: 0.0, ..stations[0] };
            stations.insert(0, top);
        }

        let directions: Vec<Vector3<f64>> =
            stations.iter().map(|s| direction(s.azimuth, s.dip)).collect();

        let collar = Point3::from(collar);
        let mut positions = Vec::with_capacity(stations.len());
        positions.push(collar);
        for (i, (upper, lower)) in stations.iter().tuple_windows().enumerate() {
            let step =
                displacement(&directions[i], &directions[i + 1], lower.distance - upper.distance);
            positions.push(positions[i] + step);
        }

        tracing::debug!(hole_id = %hole_id, stations = stations.len(), "Built trajectory");

        Ok(Self {
            hole_id,
            collar,
            stations,
            directions,
            positions,
            interpolation: Interpolation::Linear,
        })
    }

    /// Use a different scheme for depths between stations
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn hole_id(&self) -> &HoleId {
        &self.hole_id
    }

    pub fn collar(&self) -> Point3<f64> {
        self.collar
    }

    /// Stations sorted by distance, starting at distance 0
    pub fn stations(&self) -> &[SurveyStation] {
        &self.stations
    }

    /// Absolute position of every station
    pub fn station_positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Distance of the deepest station
    pub fn length(&self) -> f64 {
        self.stations.last().map(|s| s.distance).unwrap_or(0.0)
    }

    /// Position at one distance along the hole, clamped to the surveyed range
    pub fn position_at(&self, depth: f64) -> Point3<f64> {
        if depth.is_nan() {
            return Point3::new(f64::NAN, f64::NAN, f64::NAN);
        }

        let last = self.stations.len() - 1;
        if depth <= self.stations[0].distance {
            return self.positions[0];
        }
        if depth >= self.stations[last].distance {
            return self.positions[last];
        }

        let i = self.stations.partition_point(|s| s.distance <= depth) - 1;
        let offset = depth - self.stations[i].distance;
        let span = self.stations[i + 1].distance - self.stations[i].distance;
        let fraction = offset / span;

        match self.interpolation {
            Interpolation::Linear => {
                self.positions[i] + (self.positions[i + 1] - self.positions[i]) * fraction
            }
            Interpolation::Arc => {
                let t1 = &self.directions[i];
                let t = slerp_direction(t1, &self.directions[i + 1], fraction);
                self.positions[i] + displacement(t1, &t, offset)
            }
        }
    }

    /// Positions at many depths at once
    pub fn desurvey(&self, depths: &[f64]) -> Vec<Point3<f64>> {
        depths.iter().map(|&depth| self.position_at(depth)).collect()
    }

    /// Consecutive station position pairs
    pub fn from_to(&self) -> Vec<(Point3<f64>, Point3<f64>)> {
        self.positions.iter().copied().tuple_windows().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn vertical() -> Trajectory {
        Trajectory::new(
            HoleId::from("H1"),
            [0.0, 0.0, 0.0],
            vec![SurveyStation::new(0.0, 0.0, -90.0), SurveyStation::new(50.0, 0.0, -90.0)],
        )
        .unwrap()
    }

    fn curved() -> Trajectory {
        Trajectory::new(
            HoleId::from("H2"),
            [100.0, 200.0, 50.0],
            vec![
                SurveyStation::new(0.0, 45.0, -60.0),
                SurveyStation::new(30.0, 50.0, -55.0),
                SurveyStation::new(90.0, 70.0, -40.0),
            ],
        )
        .unwrap()
    }

    fn distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
        (a - b).norm()
    }

    #[test]
    fn test_vertical_hole_is_exact() {
        let positions = vertical().desurvey(&[25.0]);
        assert_eq!(positions[0], Point3::new(0.0, 0.0, -25.0));
    }

    #[test]
    fn test_direction_conventions() {
        assert_eq!(direction(0.0, -90.0), Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(direction(90.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(direction(0.0, 0.0), Vector3::new(0.0, 1.0, 0.0));
        assert!((direction(123.0, -37.0).norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ratio_factor() {
        assert_eq!(ratio_factor(0.0), 1.0);
        let beta = 0.5_f64;
        assert!((ratio_factor(beta) - 2.0 / beta * (beta / 2.0).tan()).abs() < 1e-15);
        assert!(ratio_factor(beta) > 1.0);
    }

    #[test]
    fn test_quarter_circle() {
        // Horizontal north to straight down over a quarter circle of radius r
        let r = 100.0;
        let length = std::f64::consts::FRAC_PI_2 * r;
        let trajectory = Trajectory::new(
            HoleId::from("Q"),
            [0.0, 0.0, 0.0],
            vec![SurveyStation::new(0.0, 0.0, 0.0), SurveyStation::new(length, 0.0, -90.0)],
        )
        .unwrap();

        let end = trajectory.station_positions()[1];
        assert!((end.x).abs() < 1e-9);
        assert!((end.y - r).abs() < 1e-9);
        assert!((end.z + r).abs() < 1e-9);

        // Halfway along the arc sits on the circle
        let mid =
            trajectory.clone().with_interpolation(Interpolation::Arc).position_at(length / 2.0);
        let center = Point3::new(0.0, 0.0, -r);
        assert!((distance(&mid, &center) - r).abs() < 1e-9);
    }

    #[test]
    fn test_collar_serves_as_top_station() {
        let trajectory = Trajectory::new(
            HoleId::from("H3"),
            [10.0, 10.0, 100.0],
            vec![SurveyStation::new(20.0, 0.0, -90.0), SurveyStation::new(40.0, 0.0, -90.0)],
        )
        .unwrap();

        assert_eq!(trajectory.stations().len(), 3);
        assert_eq!(trajectory.stations()[0].distance, 0.0);
        assert_eq!(trajectory.position_at(20.0), Point3::new(10.0, 10.0, 80.0));
    }

    #[test]
    fn test_unsorted_stations_are_sorted() {
        let trajectory = Trajectory::new(
            HoleId::from("H4"),
            [0.0; 3],
            vec![SurveyStation::new(50.0, 0.0, -90.0), SurveyStation::new(0.0, 0.0, -90.0)],
        )
        .unwrap();
        assert_eq!(trajectory.length(), 50.0);
        assert_eq!(trajectory.station_positions(), vertical().station_positions());
    }

    #[test]
    fn test_invalid_surveys() {
        let id = HoleId::from("bad");
        assert!(matches!(
            Trajectory::new(id.clone(), [0.0; 3], vec![]),
            Err(DrilldownError::InvalidSurvey { .. })
        ));
        assert!(matches!(
            Trajectory::new(
                id.clone(),
                [0.0; 3],
                vec![SurveyStation::new(10.0, 0.0, -90.0), SurveyStation::new(10.0, 5.0, -80.0)]
            ),
            Err(DrilldownError::InvalidSurvey { .. })
        ));
        assert!(matches!(
            Trajectory::new(id.clone(), [0.0; 3], vec![SurveyStation::new(-1.0, 0.0, -90.0)]),
            Err(DrilldownError::InvalidSurvey { .. })
        ));
        assert!(matches!(
            Trajectory::new(id.clone(), [0.0; 3], vec![SurveyStation::new(0.0, 0.0, 95.0)]),
            Err(DrilldownError::DipOutOfRange { .. })
        ));
        assert!(matches!(
            Trajectory::new(id, [f64::NAN, 0.0, 0.0], vec![SurveyStation::new(0.0, 0.0, -90.0)]),
            Err(DrilldownError::InvalidCoordinates { .. })
        ));
    }

    #[test]
    fn test_clamping() {
        let trajectory = curved();
        let positions = trajectory.station_positions();
        assert_eq!(trajectory.position_at(-5.0), positions[0]);
        assert_eq!(trajectory.position_at(500.0), positions[2]);
    }

    #[test]
    fn test_single_station() {
        let stations = vec![SurveyStation::new(0.0, 0.0, -90.0)];
        let trajectory = Trajectory::new(HoleId::from("S"), [1.0, 2.0, 3.0], stations).unwrap();
        assert_eq!(trajectory.position_at(100.0), Point3::new(1.0, 2.0, 3.0));
        assert!(trajectory.from_to().is_empty());
    }

    #[test]
    fn test_from_to_pairs() {
        let pairs = curved().from_to();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].1, pairs[1].0);
    }

    fn arb_stations() -> impl Strategy<Value = Vec<SurveyStation>> {
        prop::collection::vec((1.0..50.0f64, 0.0..360.0f64, -90.0..=90.0f64), 1..8).prop_map(
            |steps| {
                let mut distance = 0.0;
                steps
                    .into_iter()
                    .map(|(step, azimuth, dip)| {
                        let station = SurveyStation::new(distance, azimuth, dip);
                        distance += step;
                        station
                    })
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn prop_exact_at_stations(stations in arb_stations(), arc in any::<bool>()) {
            let mode = if arc { Interpolation::Arc } else { Interpolation::Linear };
            let trajectory = Trajectory::new(HoleId::from("P"), [0.0; 3], stations)
                .unwrap()
                .with_interpolation(mode);

            let pairs = trajectory.stations().iter().zip(trajectory.station_positions());
            for (station, position) in pairs {
                prop_assert_eq!(trajectory.position_at(station.distance), *position);
            }
        }

        #[test]
        fn prop_chord_never_exceeds_arc(
            stations in arb_stations(),
            depths in prop::collection::vec(0.0..400.0f64, 2..20),
            arc in any::<bool>(),
        ) {
            let mode = if arc { Interpolation::Arc } else { Interpolation::Linear };
            let trajectory = Trajectory::new(HoleId::from("P"), [0.0; 3], stations)
                .unwrap()
                .with_interpolation(mode);
            let mut depths = depths;
            depths.sort_by(|a, b| a.total_cmp(b));

            let positions = trajectory.desurvey(&depths);
            prop_assert_eq!(&positions, &trajectory.desurvey(&depths));

            for (i, j) in (0..depths.len()).tuple_windows() {
                let along = depths[j] - depths[i];
                prop_assert!(distance(&positions[i], &positions[j]) <= along + 1e-6);
            }
        }
    }
}
