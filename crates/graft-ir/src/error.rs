use derive_more::{Display, Error};

use crate::refs::{BlockRef, InstRef, ValueRef};
use crate::types::{Signature, Type};

/// Result type for IR construction and mutation.
pub type Result<T> = std::result::Result<T, IrError>;

/// Errors raised by the mutation engine.
///
/// A failing call leaves the module exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum IrError {
    /// Instruction ownership conflict.
    #[display("structural violation: {_0}")]
    StructuralViolation(#[error(not(source))] Violation),

    /// A value was asked to replace itself. Nothing was changed.
    #[display("cannot replace {_0} with itself")]
    SelfReplacement(#[error(not(source))] ValueRef),

    /// External symbol re-declared with a different signature.
    #[display("symbol `{name}` is declared as {existing}, requested {requested}")]
    SignatureConflict {
        name: String,
        existing: Signature,
        requested: Signature,
    },

    /// Call argument count does not fit the callee's parameter list.
    #[display("call to `{callee}` expects {expected} argument(s), found {found}")]
    ArityMismatch {
        callee: String,
        expected: usize,
        found: usize,
    },

    /// Operand type does not match what the instruction requires.
    #[display("type mismatch in {site}: expected {expected}, found {found}")]
    TypeMismatch {
        site: String,
        expected: Type,
        found: Type,
    },

    /// A function with this name already exists in the module.
    #[display("function `{_0}` already exists")]
    DuplicateSymbol(#[error(not(source))] String),

    #[display("operand index {index} is out of range for {inst}")]
    OperandOutOfRange { inst: InstRef, index: u32 },
}

/// The specific ownership rule a placement broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Violation {
    /// The instruction is already placed in a block.
    #[display("{inst} already belongs to {block}")]
    AlreadyPlaced { inst: InstRef, block: BlockRef },
    /// The insertion anchor is not placed in any block.
    #[display("anchor {_0} is not placed in a block")]
    DetachedAnchor(InstRef),
}

impl From<Violation> for IrError {
    fn from(violation: Violation) -> Self {
        IrError::StructuralViolation(violation)
    }
}
