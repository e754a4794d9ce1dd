use derive_more::{Display, Error, From};
use graft_ir::IrError;
use graft_passes::{PipelineError, RegistryError};

pub type Result<T> = std::result::Result<T, Error>;

/// Anything the driver can fail with.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    #[display("building the sample module failed: {_0}")]
    Ir(IrError),

    #[display("{_0}")]
    Registry(RegistryError),

    #[display("{_0}")]
    Pipeline(PipelineError),
}
