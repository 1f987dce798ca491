//! Drilldown Geo - Desurvey, hole registries, and composite meshes
//!
//! This crate positions holes in 3D with the minimum curvature method, binds
//! point and interval data to them, and assembles meshes for rendering.

pub mod dataset;
pub mod hole;
pub mod mesh;
pub mod registry;
pub mod trajectory;
pub mod validation;

pub use dataset::{HoleDataset, Interval, IntervalPosition, Intervals, Point, Points, RowKind};
pub use hole::{Hole, HoleRows};
pub use mesh::{MeshBuilder, HOLE_ID};
pub use registry::{Collars, Surveys};
pub use trajectory::Trajectory;
