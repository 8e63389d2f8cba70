// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! obs-connection: the Connection / State mirror (spec §4.2).
//!
//! A [`Connection`] owns a dedicated background worker holding the socket
//! and the live `State` exclusively; callers talk to it through two
//! channels (task queue / response queue), matching the original
//! `contindi` daemon's multiprocessing split between the socket reader and
//! the user-facing client, re-architected onto a `tokio::task` and
//! `tokio::sync::mpsc` the way `oj-daemon`'s listener tasks are built.

mod client;
mod error;
mod task;
mod worker;

pub use client::{BlobMode, Connection, WriteValue};
pub use error::ConnectionError;
pub(crate) use task::Task;
