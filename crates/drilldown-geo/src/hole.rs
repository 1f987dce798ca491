//! A located hole and the data attached to it.

use std::collections::{BTreeMap, BTreeSet};

use drilldown_core::error::{DrilldownError, Result};
use drilldown_core::models::{CompositeMesh, HoleId, LogTrack};
use drilldown_core::processing::{CategoricalField, Column};
use nalgebra::Point3;

use crate::dataset::{self, HoleDataset, Interval, Point, RowKind};
use crate::trajectory::{to_array, Trajectory};

/// One hole's rows of a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct HoleRows<K: RowKind> {
    pub depths: Vec<K::Depth>,
    pub columns: Vec<(String, Column)>,
}

impl<K: RowKind> HoleRows<K> {
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }
}

/// Trajectory of a hole plus the datasets attached to it by name
#[derive(Debug, Clone)]
pub struct Hole {
    trajectory: Trajectory,
    points: BTreeMap<String, HoleRows<Point>>,
    intervals: BTreeMap<String, HoleRows<Interval>>,
    fields: BTreeMap<(String, String), CategoricalField>,
}

impl Hole {
    pub fn new(trajectory: Trajectory) -> Self {
        Self {
            trajectory,
            points: BTreeMap::new(),
            intervals: BTreeMap::new(),
            fields: BTreeMap::new(),
        }
    }

    pub fn hole_id(&self) -> &HoleId {
        self.trajectory.hole_id()
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    pub fn collar(&self) -> Point3<f64> {
        self.trajectory.collar()
    }

    pub fn desurvey(&self, depths: &[f64]) -> Vec<Point3<f64>> {
        self.trajectory.desurvey(depths)
    }

    pub fn points(&self) -> &BTreeMap<String, HoleRows<Point>> {
        &self.points
    }

    pub(crate) fn points_mut(&mut self) -> &mut BTreeMap<String, HoleRows<Point>> {
        &mut self.points
    }

    pub fn intervals(&self) -> &BTreeMap<String, HoleRows<Interval>> {
        &self.intervals
    }

    pub(crate) fn intervals_mut(&mut self) -> &mut BTreeMap<String, HoleRows<Interval>> {
        &mut self.intervals
    }

    /// Register this hole's rows of `dataset` under `name`, along with a copy
    /// of its categorical fields
    pub fn attach<K: RowKind>(&mut self, name: impl Into<String>, dataset: &HoleDataset<K>) {
        let name = name.into();
        let rows = dataset.rows_for(self.hole_id());

        self.fields.retain(|(owner, _), _| *owner != name);
        for (column, field) in dataset.categorical_fields() {
            self.fields.insert((name.clone(), column.to_string()), field.clone());
        }

        tracing::debug!(
            hole_id = %self.hole_id(),
            dataset = %name,
            rows = rows.len(),
            "Attached hole data"
        );
        K::rows_mut(self).insert(name, rows);
    }

    /// Categorical field of a column of an attached dataset
    pub fn field(&self, dataset: &str, column: &str) -> Option<&CategoricalField> {
        self.fields.get(&(dataset.to_string(), column.to_string()))
    }

    /// Categorical column names across attached datasets
    pub fn categorical_names(&self) -> BTreeSet<&str> {
        self.fields.keys().map(|(_, column)| column.as_str()).collect()
    }

    /// Continuous column names across attached datasets
    pub fn continuous_names(&self) -> BTreeSet<&str> {
        let points = self.points.values().flat_map(|rows| rows.columns.iter());
        let intervals = self.intervals.values().flat_map(|rows| rows.columns.iter());
        points
            .chain(intervals)
            .filter(|(_, column)| !column.is_categorical())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Independent 2-vertex segments, `from[i]` to `to[i]`
    pub fn build_line_geometry(from: &[Point3<f64>], to: &[Point3<f64>]) -> CompositeMesh {
        let points = from.iter().zip(to).flat_map(|(a, b)| [to_array(a), to_array(b)]).collect();
        let cells = (0..from.len().min(to.len()) as u32).map(|i| [2 * i, 2 * i + 1]).collect();
        CompositeMesh::segments(points, cells)
    }

    /// One point primitive per position
    pub fn build_point_geometry(positions: &[Point3<f64>]) -> CompositeMesh {
        CompositeMesh::point_cloud(positions.iter().map(to_array).collect())
    }

    fn make_mesh<K: RowKind>(&self, name: &str) -> Result<CompositeMesh> {
        let rows = K::rows(self).get(name).ok_or_else(|| DrilldownError::UnknownDataset {
            hole: self.hole_id().to_string(),
            name: name.to_string(),
        })?;
        let positions = K::locate(&self.trajectory, &rows.depths);
        K::build_mesh(&positions, &rows.depths, &rows.columns, None)
    }

    pub fn make_points_mesh(&self, name: &str) -> Result<CompositeMesh> {
        self.make_mesh::<Point>(name)
    }

    pub fn make_intervals_mesh(&self, name: &str) -> Result<CompositeMesh> {
        self.make_mesh::<Interval>(name)
    }

    /// Segments joining consecutive survey stations
    pub fn make_survey_mesh(&self) -> CompositeMesh {
        let (from, to): (Vec<Point3<f64>>, Vec<Point3<f64>>) =
            self.trajectory.from_to().into_iter().unzip();
        Self::build_line_geometry(&from, &to)
    }

    pub fn make_collar_mesh(&self) -> CompositeMesh {
        Self::build_point_geometry(&[self.collar()])
    }

    fn collect_tracks<K: RowKind>(
        &self,
        names: &[&str],
        tracks: &mut Vec<LogTrack>,
        matched: &mut BTreeSet<String>,
    ) -> Result<()> {
        for (dataset_name, rows) in K::rows(self) {
            for (column_name, column) in &rows.columns {
                if !names.is_empty() && !names.contains(&column_name.as_str()) {
                    continue;
                }
                let field = self.field(dataset_name, column_name);
                tracks.push(LogTrack {
                    hole_id: self.hole_id().clone(),
                    name: column_name.clone(),
                    depths: K::log_depths(&rows.depths),
                    values: dataset::log_values(column, field)?,
                });
                matched.insert(column_name.clone());
            }
        }
        Ok(())
    }

    /// Series of the requested columns across every attached dataset, or of
    /// every column when `names` is empty
    pub fn drill_log(&self, names: &[&str]) -> Result<Vec<LogTrack>> {
        let mut tracks = Vec::new();
        let mut matched = BTreeSet::new();
        self.collect_tracks::<Point>(names, &mut tracks, &mut matched)?;
        self.collect_tracks::<Interval>(names, &mut tracks, &mut matched)?;

        if let Some(missing) = names.iter().find(|name| !matched.contains(**name)) {
            return Err(DrilldownError::UnknownColumn { name: missing.to_string() });
        }
        Ok(tracks)
    }
}
