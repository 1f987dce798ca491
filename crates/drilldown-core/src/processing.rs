pub mod colors;
pub mod encoding;

use crate::models::{AttributeArray, CellValue};

pub use colors::{cycle_color, ColorSettings, DistinctColorGenerator};
pub use encoding::{CategoricalEncoder, CategoricalField};

/// An attribute column, typed once at ingestion
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Non-numeric column stored as codes into its field
    Categorical { codes: Vec<u32>, field: CategoricalField },
    /// Numeric column
    Continuous(Vec<f64>),
}

impl Column {
    /// Classify and encode raw cells.
    ///
    /// The column is continuous when every cell has a numeric reading,
    /// otherwise every cell is treated as a category label.
    pub fn classify(name: &str, cells: &[CellValue]) -> Self {
        let numeric: Option<Vec<f64>> = cells.iter().map(CellValue::as_number).collect();

        match numeric {
            Some(values) => Column::Continuous(values),
            None => {
                let labels: Vec<String> = cells.iter().map(CellValue::as_category).collect();
                let (field, codes) = CategoricalField::encode(name, &labels);
                Column::Categorical { codes, field }
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Categorical { codes, .. } => codes.len(),
            Column::Continuous(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, Column::Categorical { .. })
    }

    pub fn field(&self) -> Option<&CategoricalField> {
        match self {
            Column::Categorical { field, .. } => Some(field),
            Column::Continuous(_) => None,
        }
    }

    pub fn field_mut(&mut self) -> Option<&mut CategoricalField> {
        match self {
            Column::Categorical { field, .. } => Some(field),
            Column::Continuous(_) => None,
        }
    }

    /// Per-primitive mesh attribute holding the same values
    pub fn to_attribute(&self) -> AttributeArray {
        match self {
            Column::Categorical { codes, .. } => AttributeArray::Categorical(codes.clone()),
            Column::Continuous(values) => AttributeArray::Continuous(values.clone()),
        }
    }

    /// Copy of the rows selected by `indices`, keeping the field intact
    pub fn select(&self, indices: &[usize]) -> Column {
        match self {
            Column::Categorical { codes, field } => Column::Categorical {
                codes: indices.iter().map(|&i| codes[i]).collect(),
                field: field.clone(),
            },
            Column::Continuous(values) => {
                Column::Continuous(indices.iter().map(|&i| values[i]).collect())
            }
        }
    }
}
