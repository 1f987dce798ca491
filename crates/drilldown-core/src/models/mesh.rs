//! Composite geometry handed to the rendering layer.

use serde::{Deserialize, Serialize};

use crate::error::{DrilldownError, Result};

/// Connectivity of a mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "cells")]
pub enum Primitives {
    /// One vertex per primitive
    Points(Vec<u32>),
    /// Independent two-vertex segments
    Lines(Vec<[u32; 2]>),
}

impl Primitives {
    pub fn len(&self) -> usize {
        match self {
            Primitives::Points(cells) => cells.len(),
            Primitives::Lines(cells) => cells.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn offset(&self, by: u32) -> Primitives {
        match self {
            Primitives::Points(cells) => Primitives::Points(cells.iter().map(|i| i + by).collect()),
            Primitives::Lines(cells) => {
                Primitives::Lines(cells.iter().map(|[a, b]| [a + by, b + by]).collect())
            }
        }
    }

    fn extend(&mut self, other: Primitives) -> Result<()> {
        match (self, other) {
            (Primitives::Points(cells), Primitives::Points(more)) => cells.extend(more),
            (Primitives::Lines(cells), Primitives::Lines(more)) => cells.extend(more),
            _ => {
                return Err(DrilldownError::IncompatibleMesh {
                    reason: "point and line primitives cannot be mixed".to_string(),
                })
            }
        }
        Ok(())
    }
}

/// Per-primitive attribute values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "lowercase")]
pub enum AttributeArray {
    Continuous(Vec<f64>),
    /// Integer category codes
    Categorical(Vec<u32>),
}

impl AttributeArray {
    pub fn len(&self) -> usize {
        match self {
            AttributeArray::Continuous(values) => values.len(),
            AttributeArray::Categorical(codes) => codes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, AttributeArray::Categorical(_))
    }

    fn extend(&mut self, other: AttributeArray) -> bool {
        match (self, other) {
            (AttributeArray::Continuous(values), AttributeArray::Continuous(more)) => {
                values.extend(more);
                true
            }
            (AttributeArray::Categorical(codes), AttributeArray::Categorical(more)) => {
                codes.extend(more);
                true
            }
            _ => false,
        }
    }
}

/// Vertices, connectivity and named per-primitive attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeMesh {
    pub points: Vec<[f64; 3]>,
    pub primitives: Primitives,
    attributes: Vec<(String, AttributeArray)>,
}

impl CompositeMesh {
    /// Point cloud with one primitive per vertex
    pub fn point_cloud(points: Vec<[f64; 3]>) -> Self {
        let cells = (0..points.len() as u32).collect();
        Self { points, primitives: Primitives::Points(cells), attributes: Vec::new() }
    }

    /// Mesh of independent segments over the given vertices
    pub fn segments(points: Vec<[f64; 3]>, cells: Vec<[u32; 2]>) -> Self {
        Self { points, primitives: Primitives::Lines(cells), attributes: Vec::new() }
    }

    /// Number of primitives (points or segments)
    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Attach an attribute, replacing any existing one of the same name
    pub fn set_attribute(&mut self, name: impl Into<String>, values: AttributeArray) -> Result<()> {
        let name = name.into();
        if values.len() != self.primitive_count() {
            return Err(DrilldownError::LengthMismatch {
                what: format!("attribute '{}'", name),
                expected: self.primitive_count(),
                found: values.len(),
            });
        }

        match self.attributes.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = values,
            None => self.attributes.push((name, values)),
        }
        Ok(())
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeArray> {
        self.attributes.iter().find(|(existing, _)| existing == name).map(|(_, values)| values)
    }

    /// Attributes in insertion order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttributeArray)> {
        self.attributes.iter().map(|(name, values)| (name.as_str(), values))
    }

    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Names of the code-valued attributes
    pub fn categorical_names(&self) -> Vec<&str> {
        self.attributes().filter(|(_, values)| values.is_categorical()).map(|(n, _)| n).collect()
    }

    /// Names of the scalar-valued attributes
    pub fn continuous_names(&self) -> Vec<&str> {
        self.attributes().filter(|(_, values)| !values.is_categorical()).map(|(n, _)| n).collect()
    }

    /// Append another mesh, re-indexing its connectivity.
    ///
    /// Both meshes must carry the same attribute names and kinds, unless
    /// `self` is still empty.
    pub fn append(&mut self, other: CompositeMesh) -> Result<()> {
        if self.is_empty() && self.points.is_empty() {
            *self = other;
            return Ok(());
        }

        if self.attributes.len() != other.attributes.len() {
            return Err(DrilldownError::IncompatibleMesh {
                reason: format!(
                    "attribute count differs ({} vs {})",
                    self.attributes.len(),
                    other.attributes.len()
                ),
            });
        }

        let offset = self.points.len() as u32;
        self.primitives.extend(other.primitives.offset(offset))?;
        self.points.extend(other.points);

        for (name, values) in other.attributes {
            let slot = self
                .attributes
                .iter_mut()
                .find(|(existing, _)| *existing == name)
                .map(|(_, slot)| slot)
                .ok_or_else(|| DrilldownError::IncompatibleMesh {
                    reason: format!("attribute '{}' missing", name),
                })?;
            if !slot.extend(values) {
                return Err(DrilldownError::IncompatibleMesh {
                    reason: format!("attribute '{}' changes kind", name),
                });
            }
        }

        Ok(())
    }

    /// Serialize for hand-off to a renderer
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| DrilldownError::Serialization(e.to_string()))
    }
}
