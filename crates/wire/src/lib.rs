// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! obs-wire: the line-free INDI-flavored XML wire codec (spec §4.1).
//!
//! Two halves: [`Chunker`] frames a byte/text stream into discrete
//! top-level elements (self-closed or balanced), and [`decode_element`] /
//! the `encode_new_*` functions turn a single framed element into, or
//! build one from, the typed [`Element`] variants and `obs-core` property
//! vectors. Framing is a hand-rolled scanner (ported from
//! `original_source/parsing.py`'s `_digest_chunk`, which predates any real
//! XML grammar); decoding a single already-framed element delegates to
//! `quick-xml`, the way `adamtc007-ob-poc`'s BPMN parser does.

mod chunk;
mod decode;
mod element;
mod encode;

pub use chunk::Chunker;
pub use decode::decode_element;
pub use element::{BlobValue, Element, SetVector};
pub use encode::{
    encode_def_blob, encode_def_number, encode_def_switch, encode_def_text, encode_new_number,
    encode_new_switch, encode_new_text,
};

use thiserror::Error;

/// Protocol version advertised in the client's initial `getProperties`.
pub const PROTOCOL_VERSION: &str = "1.7";

#[derive(Debug, Error)]
pub enum WireError {
    #[error("failed to parse element: {0}")]
    Parse(String),
    #[error("missing required attribute {0:?}")]
    MissingAttribute(&'static str),
    #[error(transparent)]
    Range(#[from] obs_core::property::RangeError),
    #[error(transparent)]
    SwitchAmbiguity(#[from] obs_core::property::SwitchRuleAmbiguity),
    #[error(transparent)]
    InvalidSwitch(#[from] obs_core::property::InvalidSwitchState),
    #[error(transparent)]
    InvalidAttribute(#[from] obs_core::property::InvalidPropertyAttribute),
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid number: {0}")]
    InvalidNumber(#[from] std::num::ParseFloatError),
    #[error("invalid integer: {0}")]
    InvalidInteger(#[from] std::num::ParseIntError),
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(#[from] chrono::ParseError),
    #[error("invalid utf-8 in encoded element: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
