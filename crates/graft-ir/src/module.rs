//! Module: arena-based IR storage.
//!
//! All IR entities (functions, blocks, instructions, values) are stored in
//! `PrimaryMap`s owned by `Module`. Operand lists use `EntityList + ListPool`
//! for compact storage, and every value carries a use-list that mirrors the
//! forward operand edges.
//!
//! This file holds the data model and its read-only accessors plus the
//! build-time API. Anything that creates a use or rewrites an operand slot
//! lives in [`crate::mutate`].

use std::collections::HashMap;
use std::fmt;

use cranelift_entity::{EntityList, ListPool, PrimaryMap, SecondaryMap};
use smallvec::SmallVec;

use crate::error::{IrError, Result, Violation};
use crate::refs::*;
use crate::types::{CallConv, Signature, Type};

// ============================================================================
// Use-list
// ============================================================================

/// A single use of a value: which instruction uses it, at which operand index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Use {
    pub user: InstRef,
    pub operand_index: u32,
}

// ============================================================================
// Instruction kinds
// ============================================================================

/// Sub-kind of a binary operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    SDiv,
    UDiv,
    SRem,
    URem,
    And,
    Or,
    Xor,
    Shl,
    LShr,
    AShr,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 13] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::SDiv,
        BinaryOp::UDiv,
        BinaryOp::SRem,
        BinaryOp::URem,
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::Xor,
        BinaryOp::Shl,
        BinaryOp::LShr,
        BinaryOp::AShr,
    ];

    pub fn from_mnemonic(text: &str) -> Option<BinaryOp> {
        Self::ALL.into_iter().find(|op| op.mnemonic() == text)
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::SDiv => "sdiv",
            BinaryOp::UDiv => "udiv",
            BinaryOp::SRem => "srem",
            BinaryOp::URem => "urem",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
            BinaryOp::Shl => "shl",
            BinaryOp::LShr => "lshr",
            BinaryOp::AShr => "ashr",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// What an instruction does.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum InstKind {
    /// Two-operand arithmetic or bitwise operator.
    Binary(BinaryOp),
    /// Call. Operand 0 is the callee's function value, the rest are arguments.
    Call,
    /// Return with zero or one operand.
    Return,
    /// Any other opcode; operands are opaque to the engine.
    Other(String),
}

// ============================================================================
// Entity data types
// ============================================================================

/// Data for a single function.
pub struct FuncData {
    pub(crate) name: String,
    pub(crate) sig: Signature,
    pub(crate) call_conv: CallConv,
    pub(crate) params: SmallVec<[ValueRef; 4]>,
    pub(crate) value: ValueRef,
    pub(crate) blocks: SmallVec<[BlockRef; 4]>,
}

impl FuncData {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.sig
    }

    pub fn return_type(&self) -> Type {
        self.sig.ret
    }

    pub fn is_variadic(&self) -> bool {
        self.sig.variadic
    }

    pub fn call_conv(&self) -> CallConv {
        self.call_conv
    }

    pub fn params(&self) -> &[ValueRef] {
        &self.params
    }

    pub fn blocks(&self) -> &[BlockRef] {
        &self.blocks
    }

    /// A function without blocks is a declaration of an external symbol.
    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Data for a basic block.
pub struct BlockData {
    pub(crate) insts: SmallVec<[InstRef; 8]>,
    pub(crate) parent_func: FuncRef,
}

impl BlockData {
    pub fn insts(&self) -> &[InstRef] {
        &self.insts
    }

    pub fn parent_func(&self) -> FuncRef {
        self.parent_func
    }
}

/// Data for a single instruction.
pub struct InstData {
    pub(crate) kind: InstKind,
    pub(crate) operands: EntityList<ValueRef>,
    pub(crate) ty: Type,
    pub(crate) result: ValueRef,
    pub(crate) parent_block: Option<BlockRef>,
}

impl InstData {
    pub fn kind(&self) -> &InstKind {
        &self.kind
    }

    /// Result type; `Void` for instructions that produce nothing.
    pub fn ty(&self) -> Type {
        self.ty
    }

    /// The value this instruction defines.
    pub fn result(&self) -> ValueRef {
        self.result
    }

    /// `None` while the instruction is built but not yet placed.
    pub fn parent_block(&self) -> Option<BlockRef> {
        self.parent_block
    }
}

/// Data for a single value.
pub struct ValueData {
    pub(crate) def: ValueDef,
    pub(crate) ty: Type,
    pub(crate) name: Option<String>,
}

impl ValueData {
    pub fn def(&self) -> ValueDef {
        self.def
    }

    pub fn ty(&self) -> Type {
        self.ty
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

// ============================================================================
// Module
// ============================================================================

/// One compilation unit. Owns every function, block, instruction and value
/// reachable from it.
pub struct Module {
    name: String,

    pub(crate) funcs: PrimaryMap<FuncRef, FuncData>,
    pub(crate) blocks: PrimaryMap<BlockRef, BlockData>,
    pub(crate) insts: PrimaryMap<InstRef, InstData>,
    pub(crate) values: PrimaryMap<ValueRef, ValueData>,

    /// Use-list: for each value, the operand slots that reference it.
    pub(crate) uses: SecondaryMap<ValueRef, SmallVec<[Use; 2]>>,

    /// Backing pool for operand lists.
    pub(crate) value_pool: ListPool<ValueRef>,

    pub(crate) symbols: HashMap<String, FuncRef>,
    constants: HashMap<(Type, i64), ValueRef>,
}

impl Module {
    /// Create a new empty module.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            funcs: PrimaryMap::new(),
            blocks: PrimaryMap::new(),
            insts: PrimaryMap::new(),
            values: PrimaryMap::new(),
            uses: SecondaryMap::new(),
            value_pool: ListPool::new(),
            symbols: HashMap::new(),
            constants: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ========================================================================
    // Function
    // ========================================================================

    /// Add a function with no body. It stays a declaration until a block is
    /// appended to it.
    pub fn add_function(
        &mut self,
        name: impl Into<String>,
        sig: Signature,
        call_conv: CallConv,
    ) -> Result<FuncRef> {
        let name = name.into();
        if self.symbols.contains_key(&name) {
            return Err(IrError::DuplicateSymbol(name));
        }

        let func = self.funcs.next_key();
        let params = sig
            .params
            .iter()
            .enumerate()
            .map(|(idx, &ty)| {
                self.values.push(ValueData {
                    def: ValueDef::Param(func, idx as u32),
                    ty,
                    name: None,
                })
            })
            .collect();
        let value = self.values.push(ValueData {
            def: ValueDef::Func(func),
            ty: Type::Ptr,
            name: None,
        });

        let pushed = self.funcs.push(FuncData {
            name: name.clone(),
            sig,
            call_conv,
            params,
            value,
            blocks: SmallVec::new(),
        });
        debug_assert_eq!(pushed, func);
        self.symbols.insert(name, func);
        Ok(func)
    }

    /// Get immutable reference to function data.
    pub fn func(&self, f: FuncRef) -> &FuncData {
        &self.funcs[f]
    }

    /// All functions, in insertion order.
    pub fn functions(&self) -> impl Iterator<Item = FuncRef> + '_ {
        self.funcs.keys()
    }

    pub fn function_count(&self) -> usize {
        self.funcs.len()
    }

    /// Look up a function by symbol name.
    pub fn lookup_function(&self, name: &str) -> Option<FuncRef> {
        self.symbols.get(name).copied()
    }

    /// Name → signature of every declaration-only function, in insertion order.
    pub fn external_declarations(&self) -> impl Iterator<Item = (&str, &Signature)> + '_ {
        self.funcs
            .values()
            .filter(|data| data.is_declaration())
            .map(|data| (data.name.as_str(), &data.sig))
    }

    /// Get the i-th parameter value of a function.
    pub fn func_param(&self, f: FuncRef, index: u32) -> ValueRef {
        self.funcs[f].params[index as usize]
    }

    pub fn func_params(&self, f: FuncRef) -> &[ValueRef] {
        &self.funcs[f].params
    }

    /// The value that refers to the function itself (callee operand).
    pub fn func_value(&self, f: FuncRef) -> ValueRef {
        self.funcs[f].value
    }

    pub fn entry_block(&self, f: FuncRef) -> Option<BlockRef> {
        self.funcs[f].blocks.first().copied()
    }

    // ========================================================================
    // Block
    // ========================================================================

    /// Append a new empty block to a function. The first block appended
    /// becomes the entry block and turns a declaration into a definition.
    pub fn append_block(&mut self, func: FuncRef) -> BlockRef {
        let block = self.blocks.push(BlockData {
            insts: SmallVec::new(),
            parent_func: func,
        });
        self.funcs[func].blocks.push(block);
        block
    }

    /// Get immutable reference to block data.
    pub fn block(&self, b: BlockRef) -> &BlockData {
        &self.blocks[b]
    }

    pub fn block_insts(&self, b: BlockRef) -> &[InstRef] {
        &self.blocks[b].insts
    }

    /// Append an instruction to the end of a block.
    pub fn append_inst(&mut self, block: BlockRef, inst: InstRef) -> Result<()> {
        if let Some(existing) = self.insts[inst].parent_block {
            return Err(Violation::AlreadyPlaced {
                inst,
                block: existing,
            }
            .into());
        }
        self.insts[inst].parent_block = Some(block);
        self.blocks[block].insts.push(inst);
        Ok(())
    }

    // ========================================================================
    // Instruction
    // ========================================================================

    /// Get immutable reference to instruction data.
    pub fn inst(&self, i: InstRef) -> &InstData {
        &self.insts[i]
    }

    /// Get the operands of an instruction as a slice.
    pub fn inst_operands(&self, i: InstRef) -> &[ValueRef] {
        self.insts[i].operands.as_slice(&self.value_pool)
    }

    pub fn inst_result(&self, i: InstRef) -> ValueRef {
        self.insts[i].result
    }

    /// The function owning the instruction's block, if it is placed.
    pub fn inst_function(&self, i: InstRef) -> Option<FuncRef> {
        self.insts[i]
            .parent_block
            .map(|block| self.blocks[block].parent_func)
    }

    /// Number of instructions currently placed in blocks.
    pub fn placed_inst_count(&self) -> usize {
        self.blocks.values().map(|b| b.insts.len()).sum()
    }

    // ========================================================================
    // Value
    // ========================================================================

    /// Get immutable reference to value data.
    pub fn value(&self, v: ValueRef) -> &ValueData {
        &self.values[v]
    }

    pub fn value_ty(&self, v: ValueRef) -> Type {
        self.values[v].ty
    }

    pub fn value_def(&self, v: ValueRef) -> ValueDef {
        self.values[v].def
    }

    pub fn value_name(&self, v: ValueRef) -> Option<&str> {
        self.values[v].name.as_deref()
    }

    /// Attach a display name to a value. Names are cosmetic and need not be
    /// unique.
    pub fn set_value_name(&mut self, v: ValueRef, name: impl Into<String>) {
        self.values[v].name = Some(name.into());
    }

    /// Integer constant of the given type. Constants are uniqued, so the same
    /// `(ty, value)` pair always yields the same `ValueRef`.
    pub fn iconst(&mut self, ty: Type, value: i64) -> ValueRef {
        if let Some(&existing) = self.constants.get(&(ty, value)) {
            return existing;
        }
        let v = self.values.push(ValueData {
            def: ValueDef::Const(value),
            ty,
            name: None,
        });
        self.constants.insert((ty, value), v);
        v
    }

    // ========================================================================
    // Use-list
    // ========================================================================

    /// Get all uses of a value.
    pub fn uses(&self, v: ValueRef) -> &[Use] {
        &self.uses[v]
    }

    /// Check if a value has any uses.
    pub fn has_uses(&self, v: ValueRef) -> bool {
        !self.uses[v].is_empty()
    }
}
