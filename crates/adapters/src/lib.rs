// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! obs-adapters: the core's external collaborators (spec §6).
//!
//! Three independent pieces, none of which the core reimplements by hand:
//! the job catalog (an HTTP client over the PocketBase-flavored collection
//! API in `original_source/scheduler/cache.py`), the astrometric helpers
//! (`astro`) a slew/sync needs to turn RA/Dec into wire values, and the
//! minimal FITS/WCS reader (`fits`) `_SyncInner` needs to recover a solved
//! frame's center-of-field coordinate.

pub mod astro;
pub mod catalog;
pub mod fits;

pub use catalog::{Catalog, CatalogError, JobPatch};
#[cfg(feature = "test-support")]
pub use catalog::FakeCatalog;
pub use catalog::http::PocketbaseCatalog;
pub use fits::{FitsError, FitsFrame};
