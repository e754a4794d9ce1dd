//! Graft IR crate.
//!
//! An arena-allocated IR (module → functions → blocks → instructions) with
//! per-value use-lists and an in-place mutation engine. Entity refs are
//! `Copy` indices into `cranelift-entity` maps, so passes can hold them
//! across rewrites without lifetimes.

pub mod error;
pub mod module;
pub mod mutate;
pub mod printer;
pub mod refs;
pub mod types;
pub mod validation;
pub mod view;
pub mod walk;

pub use error::{IrError, Result, Violation};
pub use module::{BinaryOp, BlockData, FuncData, InstData, InstKind, Module, Use, ValueData};
pub use printer::print_module;
pub use refs::{BlockRef, FuncRef, InstRef, ValueDef, ValueRef};
pub use types::{CallConv, Signature, Type};
pub use validation::{IntegrityError, ValidationResult, validate_module};
pub use view::{BinaryOpView, CallView, InstView, ReturnView};
pub use walk::{InstSite, first_match, walk_insts, walk_typed};
