//! Port trait definitions
//!
//! These traits define the interfaces that rendering and color adapters must implement.

pub mod color;
pub mod render;

pub use color::ColorGenerator;
pub use render::{ColorMaps, DrillLog, Plotter};
