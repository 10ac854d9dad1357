//! Input/output helpers.
//!
//! - forecast exports (CSV/JSON) (`export`)
//!
//! Table ingest lives in `data::store`; this module only writes derived
//! artifacts.

pub mod export;

pub use export::*;
