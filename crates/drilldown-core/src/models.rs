pub mod color;
pub mod hole;
pub mod log;
pub mod mesh;
pub mod table;

pub use color::{ColorMode, ColorOverrides, ColorSpec, Rgb};
pub use hole::{Collar, DepthRange, HoleId, SurveyStation};
pub use log::{LogDepths, LogTrack, LogValues};
pub use mesh::{AttributeArray, CompositeMesh, Primitives};
pub use table::{CellValue, DataTable};
