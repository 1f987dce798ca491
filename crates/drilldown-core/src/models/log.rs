//! Ordered downhole series for log figures.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{DepthRange, HoleId, Rgb};

/// Depth axis of a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogDepths {
    Points(Vec<f64>),
    Intervals(Vec<DepthRange>),
}

impl LogDepths {
    pub fn len(&self) -> usize {
        match self {
            LogDepths::Points(depths) => depths.len(),
            LogDepths::Intervals(ranges) => ranges.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Values of a track, categorical values decoded to their labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogValues {
    Continuous(Vec<f64>),
    Categorical {
        values: Vec<String>,
        colors: Option<BTreeMap<String, Rgb>>,
    },
}

/// One attribute of one hole, ready for a log figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogTrack {
    pub hole_id: HoleId,
    pub name: String,
    pub depths: LogDepths,
    pub values: LogValues,
}

impl LogTrack {
    pub fn is_categorical(&self) -> bool {
        matches!(self.values, LogValues::Categorical { .. })
    }
}
