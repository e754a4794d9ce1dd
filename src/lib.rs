//! Graft: an in-place IR mutation engine with a pass pipeline.
//!
//! This crate re-exports [`graft_ir`] and [`graft_passes`] and hosts the demo
//! driver's support code.

pub use graft_ir as ir;
pub use graft_passes as passes;

pub mod error;
pub mod logging;
pub mod sample;

pub use error::{Error, Result};
