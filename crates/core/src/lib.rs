// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! obs-core: shared data model for the observatory controller.
//!
//! Types here are the vocabulary the rest of the workspace builds on: the
//! INDI-flavored property vector model (§3 of the spec), the device/state
//! mirror, the job record, the process-wide configuration, and a testable
//! clock abstraction.

pub mod clock;
pub mod config;
pub mod device;
pub mod id;
pub mod job;
pub mod property;
pub mod state;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, ObservatoryConfig};
pub use device::Device;
pub use id::JobId;
pub use job::{CaptureStatus, Job, SolveStatus};
pub use property::{
    BlobElement, BlobVector, NumberElement, NumberVector, PropertyPerm, PropertyState,
    PropertyVector, SwitchElement, SwitchRule, SwitchState, SwitchVector, TextElement, TextVector,
};
pub use state::State;
