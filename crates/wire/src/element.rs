//! Decoded wire elements (spec §4.1 "Decoding").
//!
//! A tagged-variant enumeration, replacing the original's string-tag
//! dispatch (spec §9's re-architecting note).

use chrono::{DateTime, Utc};
use obs_core::property::PropertyState;
use obs_core::{BlobVector, NumberVector, SwitchVector, TextVector};

/// A server→client update against an already-defined vector: revalues
/// named elements and optionally refreshes `state`/`timeout`/`message`.
#[derive(Debug, Clone)]
pub struct SetVector<T> {
    pub device: String,
    pub name: String,
    pub state: Option<PropertyState>,
    pub timeout: Option<f64>,
    pub timestamp: DateTime<Utc>,
    pub message: Option<String>,
    pub values: Vec<(String, T)>,
}

#[derive(Debug, Clone)]
pub struct BlobValue {
    pub format: Option<String>,
    pub size: Option<u64>,
    pub bytes: Vec<u8>,
}

/// One decoded top-level wire element.
#[derive(Debug, Clone)]
pub enum Element {
    DefNumber(NumberVector),
    DefText(TextVector),
    DefSwitch(SwitchVector),
    DefBlob(BlobVector),
    SetNumber(SetVector<f64>),
    SetText(SetVector<String>),
    SetSwitch(SetVector<obs_core::SwitchState>),
    SetBlob(SetVector<BlobValue>),
    DelProperty { device: String, name: Option<String> },
    Message { device: Option<String>, timestamp: DateTime<Utc>, message: String },
}
