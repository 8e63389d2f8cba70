//! Number vectors: `{label, format, min, max, step, value}` elements.

use super::{ElementMap, VectorMeta};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Absolute tolerance used by `is_set` when comparing requested vs. mirrored
/// number values.
pub const NUMBER_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberElement {
    pub name: String,
    pub label: String,
    pub format: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumberVector {
    #[serde(flatten)]
    pub meta: VectorMeta,
    pub elements: ElementMap<NumberElement>,
}

/// A requested value fell outside `[min, max]` for its element.
#[derive(Debug, Clone, Error)]
#[error("{device}.{vector}.{element}: {value} outside range [{min}, {max}]")]
pub struct RangeError {
    pub device: String,
    pub vector: String,
    pub element: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl NumberVector {
    /// Validate a requested `{element -> value}` write against each
    /// element's declared range. Returns the validated map unchanged, or
    /// the first out-of-range violation.
    pub fn validate_write(
        &self,
        values: &[(String, f64)],
    ) -> Result<(), RangeError> {
        for (name, value) in values {
            let Some(element) = self.elements.get(name) else {
                continue;
            };
            if *value < element.min || *value > element.max {
                return Err(RangeError {
                    device: self.meta.device.clone(),
                    vector: self.meta.name.clone(),
                    element: name.clone(),
                    value: *value,
                    min: element.min,
                    max: element.max,
                });
            }
        }
        Ok(())
    }

    /// `is_set` predicate: are all requested element values already
    /// mirrored within [`NUMBER_TOLERANCE`]?
    pub fn is_set(&self, values: &[(String, f64)]) -> bool {
        values.iter().all(|(name, want)| {
            self.elements
                .get(name)
                .is_some_and(|e| (e.value - want).abs() <= NUMBER_TOLERANCE)
        })
    }
}

#[cfg(test)]
#[path = "number_tests.rs"]
mod tests;
