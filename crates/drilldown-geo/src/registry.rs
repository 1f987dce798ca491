//! Collar and survey tables for many holes.

use std::collections::BTreeMap;

use drilldown_core::config::{Interpolation, LayeredConfig};
use drilldown_core::error::{DrilldownError, Result};
use drilldown_core::models::{AttributeArray, Collar, CompositeMesh, HoleId, SurveyStation};
use drilldown_core::ports::{ColorMaps, Plotter};
use drilldown_core::processing::CategoricalField;

use crate::dataset::{HoleDataset, RowKind};
use crate::hole::Hole;
use crate::mesh::{MeshBuilder, HOLE_ID};
use crate::trajectory::Trajectory;
use crate::validation;

/// Collar location of every hole
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collars {
    collars: BTreeMap<HoleId, Collar>,
}

impl Collars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load collars, replacing any previous content
    pub fn add_data<S: AsRef<str>>(
        &mut self,
        hole_ids: &[S],
        coordinates: &[[f64; 3]],
    ) -> Result<()> {
        validation::check_length("collar coordinates", hole_ids.len(), coordinates.len())?;

        let mut collars = BTreeMap::new();
        for (hole_id, xyz) in hole_ids.iter().zip(coordinates) {
            let hole_id = HoleId::new(hole_id.as_ref());
            validation::check_coordinates(hole_id.as_str(), xyz)?;
            if collars.contains_key(&hole_id) {
                return Err(DrilldownError::DuplicateCollar { hole: hole_id.to_string() });
            }
            collars.insert(hole_id.clone(), Collar::new(hole_id, *xyz));
        }

        tracing::info!(collars = collars.len(), "Added collars");
        self.collars = collars;
        Ok(())
    }

    pub fn get(&self, hole_id: &str) -> Option<&Collar> {
        self.collars.get(&HoleId::new(hole_id))
    }

    pub fn len(&self) -> usize {
        self.collars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collars.is_empty()
    }

    /// Hole ids in sorted order
    pub fn unique_hole_ids(&self) -> impl Iterator<Item = &HoleId> {
        self.collars.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collar> {
        self.collars.values()
    }

    /// The `hole ID` field used by the collar mesh, coded in sorted order
    pub fn hole_field(&self) -> CategoricalField {
        let ids: Vec<&str> = self.collars.keys().map(HoleId::as_str).collect();
        CategoricalField::encode(HOLE_ID, &ids).0
    }

    /// One point per collar with a `hole ID` attribute
    pub fn make_mesh(&self) -> Result<CompositeMesh> {
        let mut mesh = CompositeMesh::point_cloud(self.iter().map(|c| c.coordinates).collect());
        mesh.set_attribute(HOLE_ID, AttributeArray::Categorical((0..self.len() as u32).collect()))?;
        Ok(mesh)
    }

    pub fn add_to_plotter(&self, plotter: &mut dyn Plotter) -> Result<()> {
        plotter.add_mesh("collars", &self.make_mesh()?, &ColorMaps::new())
    }
}

/// Survey stations of every hole, and the holes located from them
#[derive(Debug, Clone, Default)]
pub struct Surveys {
    stations: BTreeMap<HoleId, Vec<SurveyStation>>,
    collars: Option<Collars>,
    holes: BTreeMap<HoleId, Hole>,
    interpolation: Interpolation,
}

impl Surveys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surveys using the configured interpolation scheme
    pub fn from_config(config: &LayeredConfig) -> Self {
        Self::new().with_interpolation(config.interpolation.value)
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Load survey stations, replacing any previous content.
    ///
    /// Dips outside [-90, 90] are rejected before anything is stored. Surveys
    /// that were already located are located again against the same collars;
    /// if that fails the previous stations and holes are kept.
    pub fn add_data<S: AsRef<str>>(
        &mut self,
        hole_ids: &[S],
        distances: &[f64],
        azimuths: &[f64],
        dips: &[f64],
    ) -> Result<()> {
        let rows = hole_ids.len();
        validation::check_length("survey distances", rows, distances.len())?;
        validation::check_length("survey azimuths", rows, azimuths.len())?;
        validation::check_length("survey dips", rows, dips.len())?;
        validation::check_dips(hole_ids, dips)?;

        let mut stations: BTreeMap<HoleId, Vec<SurveyStation>> = BTreeMap::new();
        for (i, hole_id) in hole_ids.iter().enumerate() {
            stations
                .entry(HoleId::new(hole_id.as_ref()))
                .or_default()
                .push(SurveyStation::new(distances[i], azimuths[i], dips[i]));
        }

        if let Some(collars) = &self.collars {
            self.holes = self.build_holes(&stations, collars)?;
        }

        tracing::info!(holes = stations.len(), stations = rows, "Added survey stations");
        self.stations = stations;
        Ok(())
    }

    fn build_holes(
        &self,
        stations: &BTreeMap<HoleId, Vec<SurveyStation>>,
        collars: &Collars,
    ) -> Result<BTreeMap<HoleId, Hole>> {
        let mut holes = BTreeMap::new();
        for (hole_id, stations) in stations {
            let collar = collars
                .get(hole_id.as_str())
                .ok_or_else(|| DrilldownError::MissingCollar { hole: hole_id.to_string() })?;
            let trajectory =
                Trajectory::new(hole_id.clone(), collar.coordinates, stations.clone())?
                    .with_interpolation(self.interpolation);
            holes.insert(hole_id.clone(), Hole::new(trajectory));
        }
        Ok(holes)
    }

    /// Build the trajectory of every surveyed hole from its collar
    pub fn locate(&mut self, collars: &Collars) -> Result<()> {
        let holes = self.build_holes(&self.stations, collars)?;

        tracing::info!(
            holes = holes.len(),
            interpolation = ?self.interpolation,
            "Located surveys"
        );
        self.holes = holes;
        self.collars = Some(collars.clone());
        Ok(())
    }

    pub fn is_located(&self) -> bool {
        self.collars.is_some()
    }

    /// Collars used by the last `locate`
    pub fn collars(&self) -> Option<&Collars> {
        self.collars.as_ref()
    }

    /// Surveyed hole ids in sorted order
    pub fn unique_hole_ids(&self) -> impl Iterator<Item = &HoleId> {
        self.stations.keys()
    }

    pub fn stations(&self, hole_id: &str) -> Option<&[SurveyStation]> {
        self.stations.get(&HoleId::new(hole_id)).map(Vec::as_slice)
    }

    pub fn hole(&self, hole_id: &str) -> Result<&Hole> {
        if !self.is_located() {
            return Err(DrilldownError::SurveysNotLocated);
        }
        self.holes
            .get(&HoleId::new(hole_id))
            .ok_or_else(|| DrilldownError::HoleNotLocated { hole: hole_id.to_string() })
    }

    pub fn hole_mut(&mut self, hole_id: &str) -> Result<&mut Hole> {
        if !self.is_located() {
            return Err(DrilldownError::SurveysNotLocated);
        }
        self.holes
            .get_mut(&HoleId::new(hole_id))
            .ok_or_else(|| DrilldownError::HoleNotLocated { hole: hole_id.to_string() })
    }

    /// Located holes in sorted order
    pub fn holes(&self) -> impl Iterator<Item = &Hole> {
        self.holes.values()
    }

    /// Attach a dataset to every hole it has rows for.
    ///
    /// Nothing is attached unless every such hole is located.
    pub fn attach<K: RowKind>(&mut self, name: &str, dataset: &HoleDataset<K>) -> Result<()> {
        let hole_ids = dataset.hole_ids_with_rows();
        for hole_id in &hole_ids {
            self.hole(hole_id.as_str())?;
        }
        for hole_id in hole_ids {
            self.hole_mut(hole_id.as_str())?.attach(name, dataset);
        }
        Ok(())
    }

    /// The `hole ID` field of the survey mesh, coded in sorted order
    pub fn hole_field(&self) -> CategoricalField {
        let ids: Vec<&str> = self.holes.keys().map(HoleId::as_str).collect();
        CategoricalField::encode(HOLE_ID, &ids).0
    }

    /// Survey station segments of every hole, with a `hole ID` attribute
    /// coded in sorted order
    pub fn make_mesh(&self) -> Result<CompositeMesh> {
        if !self.is_located() {
            return Err(DrilldownError::SurveysNotLocated);
        }

        let mut builder = MeshBuilder::new();
        for (code, hole) in self.holes.values().enumerate() {
            let mut part = hole.make_survey_mesh();
            let codes = vec![code as u32; part.primitive_count()];
            part.set_attribute(HOLE_ID, AttributeArray::Categorical(codes))?;
            builder.push(part)?;
        }
        Ok(builder.finish())
    }

    pub fn add_to_plotter(&self, plotter: &mut dyn Plotter) -> Result<()> {
        plotter.add_mesh("surveys", &self.make_mesh()?, &ColorMaps::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Points;
    use drilldown_core::models::DataTable;

    fn collars() -> Collars {
        let mut collars = Collars::new();
        collars.add_data(&["H2", "H1"], &[[10.0, 0.0, 5.0], [0.0, 0.0, 0.0]]).unwrap();
        collars
    }

    fn surveys() -> Surveys {
        let mut surveys = Surveys::new();
        surveys
            .add_data(
                &["H1", "H1", "H2", "H2"],
                &[0.0, 50.0, 0.0, 30.0],
                &[0.0, 0.0, 90.0, 90.0],
                &[-90.0, -90.0, -45.0, -45.0],
            )
            .unwrap();
        surveys
    }

    #[test]
    fn test_duplicate_collar() {
        let mut collars = Collars::new();
        let result = collars.add_data(&["H1", "H1"], &[[0.0; 3], [1.0; 3]]);
        assert!(matches!(result, Err(DrilldownError::DuplicateCollar { .. })));
    }

    #[test]
    fn test_collar_mesh_sorted() {
        let collars = collars();
        let mesh = collars.make_mesh().unwrap();
        assert_eq!(mesh.points, vec![[0.0, 0.0, 0.0], [10.0, 0.0, 5.0]]);
        assert_eq!(collars.hole_field().decode(&[0, 1]).unwrap(), vec!["H1", "H2"]);
    }

    #[test]
    fn test_dip_out_of_range_rejected() {
        let mut surveys = Surveys::new();
        let result = surveys.add_data(&["H1"], &[0.0], &[0.0], &[-95.0]);
        assert!(matches!(result, Err(DrilldownError::DipOutOfRange { .. })));
        assert_eq!(surveys.unique_hole_ids().count(), 0);
    }

    #[test]
    fn test_locate() {
        let mut surveys = surveys();
        assert!(matches!(surveys.hole("H1"), Err(DrilldownError::SurveysNotLocated)));

        surveys.locate(&collars()).unwrap();
        assert!(surveys.is_located());
        assert_eq!(surveys.holes().count(), 2);
        assert_eq!(surveys.hole("H1").unwrap().desurvey(&[50.0])[0].z, -50.0);
        assert!(matches!(surveys.hole("H3"), Err(DrilldownError::HoleNotLocated { .. })));
    }

    #[test]
    fn test_missing_collar() {
        let mut collars = Collars::new();
        collars.add_data(&["H1"], &[[0.0; 3]]).unwrap();
        assert!(matches!(
            surveys().locate(&collars),
            Err(DrilldownError::MissingCollar { .. })
        ));
    }

    #[test]
    fn test_relocate_after_new_stations() {
        let mut surveys = surveys();
        surveys.locate(&collars()).unwrap();
        surveys.add_data(&["H1", "H1"], &[0.0, 20.0], &[0.0, 0.0], &[-90.0, -90.0]).unwrap();

        assert!(surveys.is_located());
        assert_eq!(surveys.holes().count(), 1);
        assert_eq!(surveys.hole("H1").unwrap().trajectory().length(), 20.0);
    }

    #[test]
    fn test_failed_relocate_keeps_previous_holes() {
        let mut surveys = surveys();
        surveys.locate(&collars()).unwrap();

        let result = surveys.add_data(&["H1", "H3"], &[0.0, 0.0], &[0.0, 0.0], &[-90.0, -90.0]);
        assert!(matches!(result, Err(DrilldownError::MissingCollar { .. })));

        assert!(surveys.is_located());
        assert!(surveys.collars().is_some());
        assert!(surveys.stations("H3").is_none());
        assert_eq!(surveys.stations("H2").map(<[_]>::len), Some(2));
        assert_eq!(surveys.holes().count(), 2);
        assert_eq!(surveys.hole("H1").unwrap().trajectory().length(), 50.0);
    }

    #[test]
    fn test_attach_skips_holes_without_rows() {
        let mut collars = Collars::new();
        collars.add_data(&["H1"], &[[0.0; 3]]).unwrap();
        let mut surveys = Surveys::new();
        surveys.add_data(&["H1"], &[0.0], &[0.0], &[-90.0]).unwrap();
        surveys.locate(&collars).unwrap();

        let mut points = Points::new();
        points.add_data(&["H1", "H9"], &[5.0, f64::NAN], DataTable::new(), None).unwrap();
        points.desurvey(&surveys).unwrap();

        surveys.attach("assays", &points).unwrap();
        assert!(surveys.hole("H1").unwrap().points().contains_key("assays"));
    }

    #[test]
    fn test_attach_is_all_or_nothing() {
        let mut surveys = surveys();
        surveys.locate(&collars()).unwrap();

        let mut points = Points::new();
        points.add_data(&["H1", "H9"], &[5.0, 6.0], DataTable::new(), None).unwrap();

        let result = surveys.attach("assays", &points);
        assert!(matches!(result, Err(DrilldownError::HoleNotLocated { .. })));
        assert!(surveys.hole("H1").unwrap().points().is_empty());
    }

    #[test]
    fn test_survey_hole_field() {
        let mut surveys = surveys();
        surveys.locate(&collars()).unwrap();

        let field = surveys.hole_field();
        assert_eq!(field.decode(&[0, 1]).unwrap(), vec!["H1", "H2"]);
        assert_eq!(field.code_of("H2"), Some(1));
    }

    #[test]
    fn test_survey_mesh() {
        let mut surveys = surveys();
        assert!(matches!(surveys.make_mesh(), Err(DrilldownError::SurveysNotLocated)));

        surveys.locate(&collars()).unwrap();
        let mesh = surveys.make_mesh().unwrap();
        assert_eq!(mesh.primitive_count(), 2);
        assert_eq!(mesh.points.len(), 4);
        assert_eq!(mesh.attribute(HOLE_ID), Some(&AttributeArray::Categorical(vec![0, 1])));
    }

    #[test]
    fn test_interpolation_from_config() {
        let mut config = LayeredConfig::with_defaults();
        config.interpolation.value = Interpolation::Arc;

        let mut surveys = Surveys::from_config(&config);
        surveys.add_data(&["H1"], &[0.0], &[0.0], &[-90.0]).unwrap();
        surveys.locate(&collars()).unwrap();
        assert_eq!(surveys.hole("H1").unwrap().trajectory().interpolation(), Interpolation::Arc);
    }
}
