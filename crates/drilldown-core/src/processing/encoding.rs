//! Categorical value <-> code mapping and color assignment.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::colors::{cycle_color, ColorSettings};
use crate::error::{DrilldownError, Result};
use crate::models::{ColorMode, ColorOverrides, Rgb};
use crate::ports::ColorGenerator;

/// Stable factorization of category labels into dense integer codes
pub struct CategoricalEncoder;

impl CategoricalEncoder {
    /// Encode values; codes start at 0 and follow first-occurrence order.
    ///
    /// Returns the per-value codes and the code -> value table (indexed by code).
    pub fn encode<S: AsRef<str>>(values: &[S]) -> (Vec<u32>, Vec<String>) {
        let mut lookup: HashMap<&str, u32> = HashMap::new();
        let mut categories = Vec::new();

        let codes = values
            .iter()
            .map(|value| {
                let value = value.as_ref();
                *lookup.entry(value).or_insert_with(|| {
                    categories.push(value.to_string());
                    (categories.len() - 1) as u32
                })
            })
            .collect();

        (codes, categories)
    }
}

/// Code table and color assignment of one categorical column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalField {
    name: String,
    categories: Vec<String>,
    #[serde(skip)]
    lookup: HashMap<String, u32>,
    colors: BTreeMap<String, Rgb>,
}

impl CategoricalField {
    /// Encode `values` into a new field, returning it with the per-value codes
    pub fn encode<S: AsRef<str>>(name: impl Into<String>, values: &[S]) -> (Self, Vec<u32>) {
        let (codes, categories) = CategoricalEncoder::encode(values);
        let lookup =
            categories.iter().enumerate().map(|(code, c)| (c.clone(), code as u32)).collect();

        let field = Self { name: name.into(), categories, lookup, colors: BTreeMap::new() };
        (field, codes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of distinct categories
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Categories in code order
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn code_of(&self, category: &str) -> Option<u32> {
        self.lookup.get(category).copied()
    }

    pub fn category(&self, code: u32) -> Option<&str> {
        self.categories.get(code as usize).map(String::as_str)
    }

    /// Map codes back to their category labels
    pub fn decode(&self, codes: &[u32]) -> Result<Vec<String>> {
        codes
            .iter()
            .map(|&code| {
                self.category(code).map(str::to_string).ok_or_else(|| DrilldownError::UnknownCode {
                    field: self.name.clone(),
                    code,
                })
            })
            .collect()
    }

    /// Category -> color assignments made so far
    pub fn colors(&self) -> &BTreeMap<String, Rgb> {
        &self.colors
    }

    /// True once every category has a color
    pub fn has_complete_colors(&self) -> bool {
        self.categories.iter().all(|c| self.colors.contains_key(c))
    }

    /// Colors indexed by code, available once every category has a color
    pub fn color_list(&self) -> Option<Vec<Rgb>> {
        self.categories.iter().map(|c| self.colors.get(c).copied()).collect()
    }

    /// Forget all color assignments
    pub fn clear_colors(&mut self) {
        self.colors.clear();
    }

    /// Give every category a color.
    ///
    /// Overrides are validated first and applied to categories that have no
    /// color yet. Remaining categories are filled according to `mode`: `Cycle`
    /// takes palette entries by code, `Distinct` asks `generator` for exactly
    /// as many new colors as are missing, excluding the ones already in use.
    /// Existing assignments are never changed.
    pub fn assign_colors(
        &mut self,
        overrides: Option<&ColorOverrides>,
        mode: ColorMode,
        settings: &ColorSettings,
        generator: &dyn ColorGenerator,
    ) -> Result<()> {
        if let Some(overrides) = overrides {
            let mut resolved = Vec::with_capacity(overrides.len());
            for (category, spec) in overrides {
                if !self.lookup.contains_key(category) {
                    return Err(DrilldownError::UnknownCategory {
                        field: self.name.clone(),
                        category: category.clone(),
                    });
                }
                let color = spec.to_rgb().map_err(|reason| DrilldownError::InvalidColor {
                    category: category.clone(),
                    reason,
                })?;
                resolved.push((category.clone(), color));
            }

            for (category, color) in resolved {
                match self.colors.get(&category) {
                    Some(existing) if *existing != color => tracing::warn!(
                        field = %self.name,
                        category = %category,
                        "Keeping existing color; clear colors first to reassign"
                    ),
                    Some(_) => {}
                    None => {
                        self.colors.insert(category, color);
                    }
                }
            }
        }

        let missing: Vec<(u32, String)> = self
            .categories
            .iter()
            .enumerate()
            .filter(|(_, c)| !self.colors.contains_key(*c))
            .map(|(code, c)| (code as u32, c.clone()))
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        let fill: Vec<Rgb> = match mode {
            ColorMode::Cycle => missing.iter().map(|(code, _)| cycle_color(*code)).collect(),
            ColorMode::Distinct => {
                let used: Vec<Rgb> = self.colors.values().copied().collect();
                generator.generate(missing.len(), &used, settings.seed, settings.pastel_factor)
            }
        };

        tracing::debug!(
            field = %self.name,
            filled = missing.len(),
            mode = ?mode,
            "Assigned category colors"
        );

        for ((_, category), color) in missing.into_iter().zip(fill) {
            self.colors.insert(category, color);
        }

        Ok(())
    }
}
