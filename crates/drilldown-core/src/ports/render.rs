use std::collections::BTreeMap;

use crate::error::Result;
use crate::models::{CompositeMesh, LogTrack, Rgb};

/// Attribute name -> colors indexed by category code
pub type ColorMaps = BTreeMap<String, Vec<Rgb>>;

/// Port for interactive 3D display of finished meshes
pub trait Plotter {
    /// Add a mesh under a display name, with color lists for its categorical attributes
    fn add_mesh(&mut self, name: &str, mesh: &CompositeMesh, color_maps: &ColorMaps) -> Result<()>;

    /// Present everything added so far
    fn show(&mut self) -> Result<()>;
}

/// Port for 2D downhole log figures
pub trait DrillLog {
    /// Add one attribute track
    fn add_track(&mut self, track: &LogTrack) -> Result<()>;

    /// Lay out the tracks added so far
    fn create_figure(&mut self, title: &str, y_axis_label: &str) -> Result<()>;
}
