//! A device: a named collection of property vectors.

use crate::property::PropertyVector;
use std::collections::BTreeMap;

/// A mapping from property-name to property vector, unique per device name.
///
/// Mirrors `original_source/system.py`'s `Device(UserDict)`.
#[derive(Debug, Clone, Default)]
pub struct Device {
    pub name: String,
    properties: BTreeMap<String, PropertyVector>,
}

impl Device {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), properties: BTreeMap::new() }
    }

    pub fn get(&self, property: &str) -> Option<&PropertyVector> {
        self.properties.get(property)
    }

    pub fn get_mut(&mut self, property: &str) -> Option<&mut PropertyVector> {
        self.properties.get_mut(property)
    }

    pub fn insert(&mut self, vector: PropertyVector) {
        self.properties.insert(vector.name().to_string(), vector);
    }

    pub fn remove(&mut self, property: &str) -> Option<PropertyVector> {
        self.properties.remove(property)
    }

    pub fn contains(&self, property: &str) -> bool {
        self.properties.contains_key(property)
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(|s| s.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &PropertyVector> {
        self.properties.values()
    }

    /// Derived view: property names grouped by their `group` attribute.
    /// Computed on every access, matching `Device.groups` in the original
    /// (not cached — the live mirror mutates underneath it).
    pub fn groups(&self) -> BTreeMap<String, Vec<&str>> {
        let mut groups: BTreeMap<String, Vec<&str>> = BTreeMap::new();
        for (name, vector) in &self.properties {
            groups.entry(vector.group().to_string()).or_default().push(name.as_str());
        }
        groups
    }

    /// True if this device publishes at least one blob (camera) vector.
    pub fn is_camera(&self) -> bool {
        self.properties.values().any(|v| v.as_blob().is_some())
    }
}

#[cfg(test)]
#[path = "device_tests.rs"]
mod tests;
