//! Point and interval datasets bound to holes.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use drilldown_core::error::{DrilldownError, Result};
use drilldown_core::models::{
    ColorMode, ColorOverrides, CompositeMesh, DataTable, DepthRange, HoleId, LogDepths, LogTrack,
    LogValues,
};
use drilldown_core::ports::{ColorMaps, DrillLog, Plotter};
use drilldown_core::processing::{CategoricalField, ColorSettings, Column, DistinctColorGenerator};
use nalgebra::Point3;

use crate::hole::{Hole, HoleRows};
use crate::mesh::{self, MeshBuilder, HOLE_ID};
use crate::registry::Surveys;
use crate::trajectory::Trajectory;
use crate::validation;

/// Shape of the rows of a dataset
pub trait RowKind: Sized + fmt::Debug + Clone + 'static {
    /// Depth key of one row
    type Depth: Copy + fmt::Debug + PartialEq;

    /// Desurveyed location of one row
    type Position: Copy + fmt::Debug + PartialEq;

    /// Name used for logging and plotting
    const LABEL: &'static str;

    /// Whether color maps are built automatically before logs
    const AUTO_COLOR_MAPS: bool;

    fn has_nan(depth: &Self::Depth) -> bool;

    fn check_depths(depths: &[Self::Depth]) -> Result<()>;

    fn locate(trajectory: &Trajectory, depths: &[Self::Depth]) -> Vec<Self::Position>;

    fn build_mesh(
        positions: &[Self::Position],
        depths: &[Self::Depth],
        columns: &[(String, Column)],
        hole_code: Option<u32>,
    ) -> Result<CompositeMesh>;

    fn log_depths(depths: &[Self::Depth]) -> LogDepths;

    fn rows(hole: &Hole) -> &BTreeMap<String, HoleRows<Self>>;

    fn rows_mut(hole: &mut Hole) -> &mut BTreeMap<String, HoleRows<Self>>;
}

/// Rows measured at a single depth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point;

/// Rows spanning a from-to depth range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval;

/// Desurveyed ends and midpoint of an interval
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalPosition {
    pub from: Point3<f64>,
    pub to: Point3<f64>,
    pub mid: Point3<f64>,
}

impl IntervalPosition {
    pub fn new(from: Point3<f64>, to: Point3<f64>) -> Self {
        Self { from, to, mid: nalgebra::center(&from, &to) }
    }
}

impl RowKind for Point {
    type Depth = f64;
    type Position = Point3<f64>;

    const LABEL: &'static str = "points";
    const AUTO_COLOR_MAPS: bool = false;

    fn has_nan(depth: &f64) -> bool {
        depth.is_nan()
    }

    fn check_depths(_depths: &[f64]) -> Result<()> {
        Ok(())
    }

    fn locate(trajectory: &Trajectory, depths: &[f64]) -> Vec<Point3<f64>> {
        trajectory.desurvey(depths)
    }

    fn build_mesh(
        positions: &[Point3<f64>],
        depths: &[f64],
        columns: &[(String, Column)],
        hole_code: Option<u32>,
    ) -> Result<CompositeMesh> {
        mesh::points_mesh(positions, depths, columns, hole_code)
    }

    fn log_depths(depths: &[f64]) -> LogDepths {
        LogDepths::Points(depths.to_vec())
    }

    fn rows(hole: &Hole) -> &BTreeMap<String, HoleRows<Self>> {
        hole.points()
    }

    fn rows_mut(hole: &mut Hole) -> &mut BTreeMap<String, HoleRows<Self>> {
        hole.points_mut()
    }
}

impl RowKind for Interval {
    type Depth = DepthRange;
    type Position = IntervalPosition;

    const LABEL: &'static str = "intervals";
    const AUTO_COLOR_MAPS: bool = true;

    fn has_nan(depth: &DepthRange) -> bool {
        depth.has_nan()
    }

    fn check_depths(depths: &[DepthRange]) -> Result<()> {
        validation::check_intervals(depths)
    }

    fn locate(trajectory: &Trajectory, depths: &[DepthRange]) -> Vec<IntervalPosition> {
        depths
            .iter()
            .map(|d| {
                IntervalPosition::new(trajectory.position_at(d.from), trajectory.position_at(d.to))
            })
            .collect()
    }

    fn build_mesh(
        positions: &[IntervalPosition],
        depths: &[DepthRange],
        columns: &[(String, Column)],
        hole_code: Option<u32>,
    ) -> Result<CompositeMesh> {
        mesh::intervals_mesh(positions, depths, columns, hole_code)
    }

    fn log_depths(depths: &[DepthRange]) -> LogDepths {
        LogDepths::Intervals(depths.to_vec())
    }

    fn rows(hole: &Hole) -> &BTreeMap<String, HoleRows<Self>> {
        hole.intervals()
    }

    fn rows_mut(hole: &mut Hole) -> &mut BTreeMap<String, HoleRows<Self>> {
        hole.intervals_mut()
    }
}

/// Point-indexed downhole data
pub type Points = HoleDataset<Point>;

/// Interval-indexed downhole data
pub type Intervals = HoleDataset<Interval>;

fn retain_flagged<T>(values: &mut Vec<T>, keep: &[bool]) {
    let mut flags = keep.iter();
    values.retain(|_| flags.next().copied().unwrap_or(false));
}

fn pick<T: Copy>(values: &[T], rows: &[usize]) -> Vec<T> {
    rows.iter().map(|&i| values[i]).collect()
}

/// Decoded log values of a column, using `field` for labels and colors when given
pub(crate) fn log_values(column: &Column, field: Option<&CategoricalField>) -> Result<LogValues> {
    match column {
        Column::Continuous(values) => Ok(LogValues::Continuous(values.clone())),
        Column::Categorical { codes, field: own } => {
            categorical_values(codes, field.unwrap_or(own))
        }
    }
}

fn categorical_values(codes: &[u32], field: &CategoricalField) -> Result<LogValues> {
    let values = field.decode(codes)?;
    let colors = (!field.colors().is_empty()).then(|| field.colors().clone());
    Ok(LogValues::Categorical { values, colors })
}

/// Downhole data of many holes, with columns typed at ingestion
#[derive(Debug, Clone)]
pub struct HoleDataset<K: RowKind> {
    hole_ids: Vec<HoleId>,
    hole_codes: Vec<u32>,
    hole_field: CategoricalField,
    unique_hole_ids: Vec<HoleId>,
    depths: Vec<K::Depth>,
    columns: Vec<(String, Column)>,
    positions: Option<Vec<K::Position>>,
    color_settings: ColorSettings,
    generator: DistinctColorGenerator,
    auto_color_maps: bool,
}

impl<K: RowKind> Default for HoleDataset<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: RowKind> HoleDataset<K> {
    pub fn new() -> Self {
        let empty: [&str; 0] = [];
        let (hole_field, _) = CategoricalField::encode(HOLE_ID, &empty);
        Self {
            hole_ids: Vec::new(),
            hole_codes: Vec::new(),
            hole_field,
            unique_hole_ids: Vec::new(),
            depths: Vec::new(),
            columns: Vec::new(),
            positions: None,
            color_settings: ColorSettings::default(),
            generator: DistinctColorGenerator::default(),
            auto_color_maps: K::AUTO_COLOR_MAPS,
        }
    }

    /// Use the given seed, pastel factor and default mode for color maps
    pub fn with_color_settings(mut self, settings: ColorSettings) -> Self {
        self.color_settings = settings;
        self
    }

    /// Build missing color maps automatically before producing logs
    pub fn with_auto_color_maps(mut self, enabled: bool) -> Self {
        self.auto_color_maps = enabled;
        self
    }

    /// Load rows, replacing any previous content.
    ///
    /// Rows with a NaN depth are dropped together with their hole id and data.
    /// Column names come from a labeled `data` table, or from `column_names`
    /// otherwise.
    pub fn add_data<S, D>(
        &mut self,
        hole_ids: &[S],
        depths: &[D],
        data: DataTable,
        column_names: Option<Vec<String>>,
    ) -> Result<()>
    where
        S: AsRef<str>,
        D: Copy + Into<K::Depth>,
    {
        let rows = hole_ids.len();
        validation::check_length("depths", rows, depths.len())?;
        validation::check_table_rows(&data, rows)?;
        let names = validation::resolve_column_names(&data, column_names)?;

        let (hole_field, mut hole_codes) = CategoricalField::encode(HOLE_ID, hole_ids);
        let mut hole_ids: Vec<HoleId> =
            hole_ids.iter().map(|id| HoleId::new(id.as_ref())).collect();
        let unique_hole_ids: Vec<HoleId> =
            hole_ids.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect();
        let mut depths: Vec<K::Depth> = depths.iter().map(|&d| d.into()).collect();
        let mut data = data;

        let keep: Vec<bool> = depths.iter().map(|d| !K::has_nan(d)).collect();
        let dropped = keep.iter().filter(|k| !**k).count();
        if dropped > 0 {
            retain_flagged(&mut depths, &keep);
            retain_flagged(&mut hole_ids, &keep);
            retain_flagged(&mut hole_codes, &keep);
            data.retain_rows(&keep);
            tracing::debug!(dataset = K::LABEL, dropped, "Dropped rows with NaN depths");
        }

        K::check_depths(&depths)?;

        let columns: Vec<(String, Column)> = names
            .into_iter()
            .zip(data.into_columns())
            .map(|(name, cells)| {
                let column = Column::classify(&name, &cells);
                (name, column)
            })
            .collect();

        tracing::info!(
            dataset = K::LABEL,
            rows = depths.len(),
            holes = unique_hole_ids.len(),
            columns = columns.len(),
            "Added hole data"
        );

        self.hole_ids = hole_ids;
        self.hole_codes = hole_codes;
        self.hole_field = hole_field;
        self.unique_hole_ids = unique_hole_ids;
        self.depths = depths;
        self.columns = columns;
        self.positions = None;
        Ok(())
    }

    /// Number of rows kept after NaN filtering
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    /// Sorted set of hole ids given to `add_data`
    pub fn unique_hole_ids(&self) -> &[HoleId] {
        &self.unique_hole_ids
    }

    /// Hole id of every row
    pub fn hole_ids(&self) -> &[HoleId] {
        &self.hole_ids
    }

    pub fn depths(&self) -> &[K::Depth] {
        &self.depths
    }

    /// The `hole ID` field; codes follow first occurrence in the input
    pub fn hole_field(&self) -> &CategoricalField {
        &self.hole_field
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, column)| column)
    }

    pub fn columns(&self) -> &[(String, Column)] {
        &self.columns
    }

    /// `hole ID` followed by the categorical data columns
    pub fn categorical_names(&self) -> Vec<&str> {
        std::iter::once(HOLE_ID)
            .chain(self.columns.iter().filter(|(_, c)| c.is_categorical()).map(|(n, _)| n.as_str()))
            .collect()
    }

    pub fn continuous_names(&self) -> Vec<&str> {
        self.columns.iter().filter(|(_, c)| !c.is_categorical()).map(|(n, _)| n.as_str()).collect()
    }

    /// Field of a categorical column or of `hole ID`
    pub fn field(&self, name: &str) -> Option<&CategoricalField> {
        if name == HOLE_ID {
            return Some(&self.hole_field);
        }
        self.column(name).and_then(Column::field)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut CategoricalField> {
        if name == HOLE_ID {
            return Some(&mut self.hole_field);
        }
        self.columns.iter_mut().find(|(n, _)| n == name).and_then(|(_, c)| c.field_mut())
    }

    /// Categorical data columns with their fields
    pub fn categorical_fields(&self) -> impl Iterator<Item = (&str, &CategoricalField)> {
        self.columns.iter().filter_map(|(name, column)| column.field().map(|f| (name.as_str(), f)))
    }

    /// Row indices per hole, in sorted hole order; holes without rows are absent
    fn groups(&self) -> BTreeMap<&HoleId, Vec<usize>> {
        let mut groups: BTreeMap<&HoleId, Vec<usize>> = BTreeMap::new();
        for (row, hole_id) in self.hole_ids.iter().enumerate() {
            groups.entry(hole_id).or_default().push(row);
        }
        groups
    }

    /// Sorted hole ids that still have rows after NaN filtering
    pub fn hole_ids_with_rows(&self) -> Vec<&HoleId> {
        self.groups().into_keys().collect()
    }

    fn rows_of(&self, hole_id: &HoleId) -> Vec<usize> {
        self.hole_ids
            .iter()
            .enumerate()
            .filter(|(_, id)| *id == hole_id)
            .map(|(row, _)| row)
            .collect()
    }

    fn select_columns(&self, rows: &[usize]) -> Vec<(String, Column)> {
        self.columns.iter().map(|(name, column)| (name.clone(), column.select(rows))).collect()
    }

    /// This dataset's rows for one hole
    pub fn rows_for(&self, hole_id: &HoleId) -> HoleRows<K> {
        let rows = self.rows_of(hole_id);
        HoleRows { depths: pick(&self.depths, &rows), columns: self.select_columns(&rows) }
    }

    /// Position every row along its hole's trajectory
    pub fn desurvey(&mut self, surveys: &Surveys) -> Result<()> {
        if !surveys.is_located() {
            return Err(DrilldownError::SurveysNotLocated);
        }

        let mut positions: Vec<Option<K::Position>> = vec![None; self.depths.len()];
        for (hole_id, rows) in self.groups() {
            let trajectory = surveys.hole(hole_id.as_str())?.trajectory();
            let located = K::locate(trajectory, &pick(&self.depths, &rows));
            for (row, position) in rows.into_iter().zip(located) {
                positions[row] = Some(position);
            }
        }

        let positions: Vec<K::Position> =
            positions.into_iter().collect::<Option<Vec<_>>>().ok_or(DrilldownError::NotDesurveyed)?;

        tracing::info!(dataset = K::LABEL, rows = positions.len(), "Desurveyed hole data");
        self.positions = Some(positions);
        Ok(())
    }

    pub fn is_desurveyed(&self) -> bool {
        self.positions.is_some()
    }

    /// Desurveyed location of every row
    pub fn positions(&self) -> Result<&[K::Position]> {
        self.positions.as_deref().ok_or(DrilldownError::NotDesurveyed)
    }

    /// Composite mesh of every hole's rows, in sorted hole order
    pub fn make_mesh(&self) -> Result<CompositeMesh> {
        let positions = self.positions()?;

        let mut builder = MeshBuilder::new();
        for (hole_id, rows) in self.groups() {
            let code = self
                .hole_field
                .code_of(hole_id.as_str())
                .ok_or_else(|| DrilldownError::UnknownHole { hole: hole_id.to_string() })?;
            let part = K::build_mesh(
                &pick(positions, &rows),
                &pick(&self.depths, &rows),
                &self.select_columns(&rows),
                Some(code),
            )?;
            builder.push(part)?;
        }

        let parts = builder.parts();
        let mesh = builder.finish();
        tracing::debug!(
            dataset = K::LABEL,
            holes = parts,
            primitives = mesh.primitive_count(),
            "Built composite mesh"
        );
        Ok(mesh)
    }

    /// Assign colors to the categories of one categorical column or `hole ID`
    pub fn add_categorical_cmap(
        &mut self,
        name: &str,
        overrides: Option<&ColorOverrides>,
        mode: ColorMode,
    ) -> Result<()> {
        let settings = self.color_settings;
        let generator = self.generator;
        let field = self
            .field_mut(name)
            .ok_or_else(|| DrilldownError::UnknownColumn { name: name.to_string() })?;
        field.assign_colors(overrides, mode, &settings, &generator)
    }

    /// Fill color maps of the given columns, or of every categorical column
    /// lacking one when `names` is empty
    pub fn construct_color_maps(&mut self, names: &[&str]) -> Result<()> {
        let names: Vec<String> = if names.is_empty() {
            self.categorical_names()
                .into_iter()
                .filter(|name| self.field(name).is_some_and(|f| !f.has_complete_colors()))
                .map(str::to_string)
                .collect()
        } else {
            names.iter().map(|name| name.to_string()).collect()
        };

        let mode = self.color_settings.mode;
        for name in &names {
            self.add_categorical_cmap(name, None, mode)?;
        }
        Ok(())
    }

    /// Color lists, indexed by code, of every fully colored field
    pub fn color_maps(&self) -> ColorMaps {
        self.categorical_names()
            .into_iter()
            .filter_map(|name| {
                let colors = self.field(name)?.color_list()?;
                Some((name.to_string(), colors))
            })
            .collect()
    }

    /// Series of one hole for the requested columns, or every column when
    /// `names` is empty
    pub fn drill_log(&mut self, hole_id: &str, names: &[&str]) -> Result<Vec<LogTrack>> {
        let hole_id = HoleId::new(hole_id);
        if self.unique_hole_ids.binary_search(&hole_id).is_err() {
            return Err(DrilldownError::UnknownHole { hole: hole_id.to_string() });
        }

        if self.auto_color_maps {
            self.construct_color_maps(&[])?;
        }

        let names: Vec<String> = if names.is_empty() {
            self.categorical_names()
                .into_iter()
                .chain(self.continuous_names())
                .map(str::to_string)
                .collect()
        } else {
            names.iter().map(|name| name.to_string()).collect()
        };

        let rows = self.rows_of(&hole_id);
        let depths = K::log_depths(&pick(&self.depths, &rows));

        names
            .into_iter()
            .map(|name| {
                let values = if name == HOLE_ID {
                    categorical_values(&pick(&self.hole_codes, &rows), &self.hole_field)?
                } else {
                    let column = self
                        .column(&name)
                        .ok_or_else(|| DrilldownError::UnknownColumn { name: name.clone() })?;
                    log_values(&column.select(&rows), None)?
                };
                Ok(LogTrack { hole_id: hole_id.clone(), name, depths: depths.clone(), values })
            })
            .collect()
    }

    /// Hand one hole's tracks to a log figure titled with the hole id
    pub fn render_log(
        &mut self,
        hole_id: &str,
        names: &[&str],
        log: &mut dyn DrillLog,
    ) -> Result<()> {
        for track in self.drill_log(hole_id, names)? {
            log.add_track(&track)?;
        }
        log.create_figure(hole_id, "Depth (m)")
    }

    /// Hand the composite mesh and its color maps to a plotter
    pub fn add_to_plotter(&mut self, plotter: &mut dyn Plotter) -> Result<()> {
        let mesh = self.make_mesh()?;
        self.construct_color_maps(&[])?;
        plotter.add_mesh(K::LABEL, &mesh, &self.color_maps())
    }
}
