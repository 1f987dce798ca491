//! Error types for Drilldown

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DrilldownError {
    // Table shape errors
    #[error("Length mismatch: {what} has {found} rows, expected {expected}")]
    LengthMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("Column names must be provided when data is not labeled")]
    MissingColumnNames,

    #[error("Got {found} column names for {expected} data columns")]
    ColumnNameCount { expected: usize, found: usize },

    #[error("Data for column {name} not present")]
    UnknownColumn { name: String },

    // Survey and collar errors
    #[error("Dip values must be between -90 and 90 degrees (hole {hole}: {dip})")]
    DipOutOfRange { hole: String, dip: f64 },

    #[error("Invalid survey for hole {hole}: {reason}")]
    InvalidSurvey { hole: String, reason: String },

    #[error("Hole {hole} has more than one collar")]
    DuplicateCollar { hole: String },

    #[error("No collar found for hole {hole}")]
    MissingCollar { hole: String },

    #[error("Invalid coordinates for hole {hole}: {reason}")]
    InvalidCoordinates { hole: String, reason: String },

    // Interval errors
    #[error("Invalid interval at row {row}: from ({from}) is greater than to ({to})")]
    InvalidInterval { row: usize, from: f64, to: f64 },

    // Hole lookup errors
    #[error("Hole ID {hole} not present")]
    UnknownHole { hole: String },

    #[error("Hole {hole} has not been located. Run Surveys::locate first")]
    HoleNotLocated { hole: String },

    #[error("Surveys have not been located against collars")]
    SurveysNotLocated,

    #[error("Dataset has not been desurveyed")]
    NotDesurveyed,

    #[error("No dataset named {name} attached to hole {hole}")]
    UnknownDataset { hole: String, name: String },

    // Mesh errors
    #[error("Cannot combine meshes: {reason}")]
    IncompatibleMesh { reason: String },

    // Categorical errors
    #[error("Category {category} not present in field {field}")]
    UnknownCategory { field: String, category: String },

    #[error("Code {code} not present in field {field}")]
    UnknownCode { field: String, code: u32 },

    #[error("Invalid color for category {category}: {reason}")]
    InvalidColor { category: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    #[error("Configuration file not found at {path}")]
    ConfigNotFound { path: PathBuf },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, DrilldownError>;
