//! Graft pass crate.
//!
//! The pass protocol ([`ModulePass`], [`Preservation`]), the pipeline driver
//! ([`PassManager`]), an opt-in [`Fixpoint`] wrapper, the plugin registry and
//! the two binary-operator passes built on `graft-ir`.

pub mod error;
pub mod fixpoint;
pub mod manager;
pub mod pass;
pub mod registry;
pub mod scan;
pub mod skeleton;
pub mod transforms;

pub use error::{PassError, PipelineError, RegistryError};
pub use fixpoint::{Fixpoint, FixpointConfig, FixpointResult};
pub use manager::{PassManager, PassRecord, PipelineReport};
pub use pass::{ModulePass, Preservation};
pub use registry::{
    PASS_PLUGIN_API_VERSION, PassRegistry, PipelineOptions, PluginInfo, PluginSetup,
};
pub use scan::{MutationOutcome, Step, scan_binary_ops};
pub use transforms::{InstrumentationPass, LOG_BIN_OP, OperatorRewritePass};
