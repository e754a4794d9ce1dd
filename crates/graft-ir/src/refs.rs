//! Entity references for the IR arenas.
//!
//! Each ref type is a thin `u32` wrapper providing type-safe indexing
//! into `PrimaryMap` storage in `Module`. Refs are `Copy` and stay valid
//! for the lifetime of the module; nothing is ever removed from an arena.

use cranelift_entity::entity_impl;
use std::fmt;

/// Reference to a function in the arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FuncRef(u32);
entity_impl!(FuncRef, "fn");

/// Reference to a basic block in the arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockRef(u32);
entity_impl!(BlockRef, "bb");

/// Reference to an instruction in the arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstRef(u32);
entity_impl!(InstRef, "inst");

/// Reference to a value (anything usable as an operand).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueRef(u32);
entity_impl!(ValueRef, "v");

/// Where a value comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueDef {
    /// Result of an instruction.
    Inst(InstRef),
    /// Function parameter at the given index.
    Param(FuncRef, u32),
    /// Integer constant, uniqued per type.
    Const(i64),
    /// Reference to a function, defined or declared.
    Func(FuncRef),
}

impl fmt::Display for ValueDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueDef::Inst(inst) => write!(f, "{inst}"),
            ValueDef::Param(func, idx) => write!(f, "{func}#{idx}"),
            ValueDef::Const(value) => write!(f, "const {value}"),
            ValueDef::Func(func) => write!(f, "&{func}"),
        }
    }
}
