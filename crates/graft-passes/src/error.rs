use derive_more::{Display, Error, From};
use graft_ir::IrError;

use crate::manager::PipelineReport;

/// Errors a pass may surface to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From)]
pub enum PassError {
    /// A mutation engine call failed; the module is unchanged by that call.
    #[display("{_0}")]
    Ir(IrError),

    /// Pass-specific failure.
    #[from(ignore)]
    #[display("{_0}")]
    Failed(#[error(not(source))] String),
}

/// A pass failure, tagged with where in the pipeline it happened.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("pass #{position} `{pass}` failed: {source}")]
pub struct PipelineError {
    pub pass: String,
    pub position: usize,
    pub source: PassError,
    /// Verdicts of the passes that completed before the failure.
    pub report: PipelineReport,
}

/// Errors raised while loading plugins or assembling pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum RegistryError {
    /// Load-time rejection of a plugin built against another API version.
    #[display("plugin `{plugin}` targets pass API v{found}, host provides v{expected}")]
    ApiVersionMismatch {
        plugin: String,
        expected: u32,
        found: u32,
    },

    #[display("pass `{_0}` is already registered")]
    DuplicatePass(#[error(not(source))] String),

    #[display("unknown pass `{_0}`")]
    UnknownPass(#[error(not(source))] String),

    #[display("malformed pipeline `{_0}`")]
    MalformedPipeline(#[error(not(source))] String),
}
