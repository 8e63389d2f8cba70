//! Blob vectors: `{label, format, size, bytes}` elements, used for images.
//!
//! Blob vectors are read-only from the client side; they do not construct
//! mutation elements and their `is_set` predicate is unconditionally true
//! (writes are not value-confirmed — spec §4.1).

use super::{ElementMap, VectorMeta};
use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize)]
pub struct BlobElement {
    pub name: String,
    pub label: String,
    pub format: Option<String>,
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Vec<u8>>,
}

impl std::fmt::Debug for BlobElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobElement")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("size", &self.size)
            .field("format", &self.format)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobVector {
    #[serde(flatten)]
    pub meta: VectorMeta,
    pub elements: ElementMap<BlobElement>,
}

impl BlobVector {
    /// Blob writes are never value-confirmed.
    pub fn is_set(&self, _values: &[(String, Vec<u8>)]) -> bool {
        true
    }

    /// Returns the element's current payload and declared format, if any
    /// has been received yet.
    pub fn latest(&self, element_name: &str) -> Option<(&[u8], &str)> {
        let element = self.elements.get(element_name)?;
        let value = element.value.as_deref()?;
        let format = element.format.as_deref()?;
        Some((value, format))
    }
}

#[cfg(test)]
#[path = "blob_tests.rs"]
mod tests;
