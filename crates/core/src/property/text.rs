//! Text vectors: `{label, value}` elements.

use super::{ElementMap, VectorMeta};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextElement {
    pub name: String,
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextVector {
    #[serde(flatten)]
    pub meta: VectorMeta,
    pub elements: ElementMap<TextElement>,
}

impl TextVector {
    /// `is_set` predicate: string equality against every requested element.
    pub fn is_set(&self, values: &[(String, String)]) -> bool {
        values
            .iter()
            .all(|(name, want)| self.elements.get(name).is_some_and(|e| &e.value == want))
    }
}

#[cfg(test)]
#[path = "text_tests.rs"]
mod tests;
