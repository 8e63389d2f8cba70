//! Property vector data model.
//!
//! A property vector is a typed, named collection of elements exposed by a
//! remote device (number / text / switch / blob). This module defines the
//! vocabulary shared by all four variants; the wire codec builds and
//! mutates these types, it does not own them.

pub mod blob;
pub mod number;
pub mod switch;
pub mod text;

pub use blob::{BlobElement, BlobVector};
pub use number::{NumberElement, NumberVector, RangeError, NUMBER_TOLERANCE};
pub use switch::{InvalidSwitchState, SwitchElement, SwitchRule, SwitchRuleAmbiguity, SwitchState, SwitchVector};
pub use text::{TextElement, TextVector};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a property vector, as published by the remote device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyState {
    Idle,
    Ok,
    Busy,
    Alert,
}

impl fmt::Display for PropertyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PropertyState::Idle => "Idle",
            PropertyState::Ok => "Ok",
            PropertyState::Busy => "Busy",
            PropertyState::Alert => "Alert",
        })
    }
}

impl std::str::FromStr for PropertyState {
    type Err = InvalidPropertyAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Idle" => Ok(PropertyState::Idle),
            "Ok" => Ok(PropertyState::Ok),
            "Busy" => Ok(PropertyState::Busy),
            "Alert" => Ok(PropertyState::Alert),
            other => Err(InvalidPropertyAttribute::state(other)),
        }
    }
}

/// Permission a property vector was published with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyPerm {
    #[serde(rename = "ro")]
    Ro,
    #[serde(rename = "wo")]
    Wo,
    #[serde(rename = "rw")]
    Rw,
}

impl fmt::Display for PropertyPerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PropertyPerm::Ro => "ro",
            PropertyPerm::Wo => "wo",
            PropertyPerm::Rw => "rw",
        })
    }
}

impl std::str::FromStr for PropertyPerm {
    type Err = InvalidPropertyAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ro" => Ok(PropertyPerm::Ro),
            "wo" => Ok(PropertyPerm::Wo),
            "rw" => Ok(PropertyPerm::Rw),
            other => Err(InvalidPropertyAttribute::perm(other)),
        }
    }
}

/// Raised parsing a vector's `state`/`perm` attribute out of its wire value.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{attribute} {value:?} is not an allowed value")]
pub struct InvalidPropertyAttribute {
    attribute: &'static str,
    value: String,
}

impl InvalidPropertyAttribute {
    fn state(value: &str) -> Self {
        Self { attribute: "PropertyState", value: value.to_string() }
    }

    fn perm(value: &str) -> Self {
        Self { attribute: "PropertyPerm", value: value.to_string() }
    }
}

/// Attributes shared by every property vector variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorMeta {
    pub device: String,
    pub name: String,
    pub label: String,
    pub group: String,
    pub state: PropertyState,
    pub perm: PropertyPerm,
    pub timeout: f64,
    pub timestamp: DateTime<Utc>,
    pub message: Option<String>,
}

/// An ordered name → element map: insertion order is preserved and names
/// are unique, matching the wire protocol's element ordering invariant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementMap<T> {
    entries: Vec<(String, T)>,
}

impl<T> ElementMap<T> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Insert or replace the element with this name, preserving its
    /// original position on replace and appending on first insert.
    pub fn insert(&mut self, name: impl Into<String>, value: T) {
        let name = name.into();
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        self.entries.iter_mut().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut T)> {
        self.entries.iter_mut().map(|(n, v)| (n.as_str(), &mut *v))
    }
}

/// A typed property vector, as held in a [`crate::Device`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum PropertyVector {
    Number(NumberVector),
    Text(TextVector),
    Switch(SwitchVector),
    Blob(BlobVector),
}

impl PropertyVector {
    pub fn meta(&self) -> &VectorMeta {
        match self {
            PropertyVector::Number(v) => &v.meta,
            PropertyVector::Text(v) => &v.meta,
            PropertyVector::Switch(v) => &v.meta,
            PropertyVector::Blob(v) => &v.meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut VectorMeta {
        match self {
            PropertyVector::Number(v) => &mut v.meta,
            PropertyVector::Text(v) => &mut v.meta,
            PropertyVector::Switch(v) => &mut v.meta,
            PropertyVector::Blob(v) => &mut v.meta,
        }
    }

    pub fn device(&self) -> &str {
        &self.meta().device
    }

    pub fn name(&self) -> &str {
        &self.meta().name
    }

    pub fn group(&self) -> &str {
        &self.meta().group
    }

    pub fn as_blob(&self) -> Option<&BlobVector> {
        match self {
            PropertyVector::Blob(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
