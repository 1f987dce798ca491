//! Composite meshes built from desurveyed rows.

use drilldown_core::error::Result;
use drilldown_core::models::{AttributeArray, CompositeMesh, DepthRange};
use drilldown_core::processing::Column;
use nalgebra::Point3;

use crate::dataset::IntervalPosition;
use crate::hole::Hole;

/// Attribute carrying the code of the owning hole
pub const HOLE_ID: &str = "hole ID";

/// Concatenates per-hole meshes into one composite mesh.
///
/// Parts are appended in push order; empty parts are skipped.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    mesh: Option<CompositeMesh>,
    parts: usize,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, part: CompositeMesh) -> Result<()> {
        if part.is_empty() {
            return Ok(());
        }

        match &mut self.mesh {
            Some(mesh) => mesh.append(part)?,
            None => self.mesh = Some(part),
        }
        self.parts += 1;
        Ok(())
    }

    /// Number of non-empty parts pushed so far
    pub fn parts(&self) -> usize {
        self.parts
    }

    pub fn finish(self) -> CompositeMesh {
        self.mesh.unwrap_or_else(|| CompositeMesh::point_cloud(Vec::new()))
    }
}

fn set_coordinates<'a>(
    mesh: &mut CompositeMesh,
    positions: impl Iterator<Item = &'a Point3<f64>> + Clone,
) -> Result<()> {
    mesh.set_attribute("x", AttributeArray::Continuous(positions.clone().map(|p| p.x).collect()))?;
    mesh.set_attribute("y", AttributeArray::Continuous(positions.clone().map(|p| p.y).collect()))?;
    mesh.set_attribute("z", AttributeArray::Continuous(positions.map(|p| p.z).collect()))?;
    Ok(())
}

/// Data columns never replace attributes already derived from the geometry
fn set_columns(mesh: &mut CompositeMesh, columns: &[(String, Column)]) -> Result<()> {
    for (name, column) in columns {
        if mesh.attribute(name).is_none() {
            mesh.set_attribute(name.clone(), column.to_attribute())?;
        }
    }
    Ok(())
}

/// One point per row with data columns, `depth`, `hole ID` and coordinates
pub fn points_mesh(
    positions: &[Point3<f64>],
    depths: &[f64],
    columns: &[(String, Column)],
    hole_code: Option<u32>,
) -> Result<CompositeMesh> {
    let mut mesh = Hole::build_point_geometry(positions);

    set_columns(&mut mesh, columns)?;
    mesh.set_attribute("depth", AttributeArray::Continuous(depths.to_vec()))?;
    if let Some(code) = hole_code {
        mesh.set_attribute(HOLE_ID, AttributeArray::Categorical(vec![code; positions.len()]))?;
    }
    set_coordinates(&mut mesh, positions.iter())?;

    Ok(mesh)
}

/// One segment per row with depths, `hole ID`, midpoint coordinates and data columns
pub fn intervals_mesh(
    positions: &[IntervalPosition],
    depths: &[DepthRange],
    columns: &[(String, Column)],
    hole_code: Option<u32>,
) -> Result<CompositeMesh> {
    let (from, to): (Vec<Point3<f64>>, Vec<Point3<f64>>) =
        positions.iter().map(|p| (p.from, p.to)).unzip();
    let mut mesh = Hole::build_line_geometry(&from, &to);

    let from_depths = depths.iter().map(|d| d.from).collect();
    let to_depths = depths.iter().map(|d| d.to).collect();
    mesh.set_attribute("from", AttributeArray::Continuous(from_depths))?;
    mesh.set_attribute("to", AttributeArray::Continuous(to_depths))?;
    if let Some(code) = hole_code {
        mesh.set_attribute(HOLE_ID, AttributeArray::Categorical(vec![code; positions.len()]))?;
    }
    set_coordinates(&mut mesh, positions.iter().map(|p| &p.mid))?;
    set_columns(&mut mesh, columns)?;

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use drilldown_core::models::CellValue;

    fn lith(values: &[&str]) -> Vec<(String, Column)> {
        let cells: Vec<CellValue> = values.iter().map(|v| CellValue::from(*v)).collect();
        vec![("lith".to_string(), Column::classify("lith", &cells))]
    }

    #[test]
    fn test_points_attribute_order() {
        let positions = vec![Point3::new(0.0, 0.0, -5.0), Point3::new(0.0, 0.0, -7.0)];
        let mesh = points_mesh(&positions, &[5.0, 7.0], &lith(&["A", "B"]), Some(3)).unwrap();

        assert_eq!(mesh.attribute_names(), vec!["lith", "depth", HOLE_ID, "x", "y", "z"]);
        assert_eq!(mesh.attribute(HOLE_ID), Some(&AttributeArray::Categorical(vec![3, 3])));
        assert_eq!(mesh.attribute("z"), Some(&AttributeArray::Continuous(vec![-5.0, -7.0])));
        assert_eq!(mesh.categorical_names(), vec!["lith", HOLE_ID]);
    }

    #[test]
    fn test_intervals_attribute_order() {
        let positions = vec![IntervalPosition::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, -10.0),
        )];
        let mesh = intervals_mesh(&positions, &[DepthRange::new(0.0, 10.0)], &lith(&["A"]), Some(0))
            .unwrap();

        assert_eq!(mesh.attribute_names(), vec!["from", "to", HOLE_ID, "x", "y", "z", "lith"]);
        assert_eq!(mesh.points.len(), 2);
        assert_eq!(mesh.attribute("z"), Some(&AttributeArray::Continuous(vec![-5.0])));
    }

    #[test]
    fn test_derived_attributes_win_over_data_columns() {
        let cells = vec![CellValue::from(99.0)];
        let columns = vec![
            ("z".to_string(), Column::classify("z", &cells)),
            (HOLE_ID.to_string(), Column::classify(HOLE_ID, &cells)),
        ];
        let positions = vec![IntervalPosition::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, -10.0),
        )];
        let mesh =
            intervals_mesh(&positions, &[DepthRange::new(0.0, 10.0)], &columns, Some(4)).unwrap();
        assert_eq!(mesh.attribute("z"), Some(&AttributeArray::Continuous(vec![-5.0])));
        assert_eq!(mesh.attribute(HOLE_ID), Some(&AttributeArray::Categorical(vec![4])));

        let mesh = points_mesh(&[Point3::new(0.0, 0.0, -2.0)], &[2.0], &columns, Some(4)).unwrap();
        assert_eq!(mesh.attribute("z"), Some(&AttributeArray::Continuous(vec![-2.0])));
        assert_eq!(mesh.attribute(HOLE_ID), Some(&AttributeArray::Categorical(vec![4])));
    }

    #[test]
    fn test_builder_skips_empty_parts() {
        let mut builder = MeshBuilder::new();
        builder.push(points_mesh(&[], &[], &[], Some(0)).unwrap()).unwrap();

        let one = points_mesh(&[Point3::new(1.0, 1.0, 1.0)], &[1.0], &[], Some(1)).unwrap();
        builder.push(one.clone()).unwrap();
        builder.push(one).unwrap();

        assert_eq!(builder.parts(), 2);
        let mesh = builder.finish();
        assert_eq!(mesh.primitive_count(), 2);
        assert_eq!(mesh.attribute(HOLE_ID), Some(&AttributeArray::Categorical(vec![1, 1])));
    }

    #[test]
    fn test_empty_builder() {
        assert!(MeshBuilder::new().finish().is_empty());
    }
}
