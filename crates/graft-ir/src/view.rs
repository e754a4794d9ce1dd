//! Typed instruction views.
//!
//! A view is a `Copy` snapshot of one instruction's kind-specific payload.
//! `from_inst` is a total match: it returns `None` for any other kind and
//! never panics. Views do not track later mutations; re-read them after
//! rewriting operands.

use crate::module::{BinaryOp, InstKind, Module};
use crate::refs::{FuncRef, InstRef, ValueDef, ValueRef};

/// Trait for typed instruction wrappers.
pub trait InstView: Sized + Copy {
    fn from_inst(module: &Module, inst: InstRef) -> Option<Self>;
    fn inst(&self) -> InstRef;

    fn matches(module: &Module, inst: InstRef) -> bool {
        Self::from_inst(module, inst).is_some()
    }
}

/// A binary operator with its two operands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BinaryOpView {
    pub inst: InstRef,
    pub op: BinaryOp,
    pub lhs: ValueRef,
    pub rhs: ValueRef,
}

impl InstView for BinaryOpView {
    fn from_inst(module: &Module, inst: InstRef) -> Option<Self> {
        let InstKind::Binary(op) = *module.inst(inst).kind() else {
            return None;
        };
        match *module.inst_operands(inst) {
            [lhs, rhs] => Some(Self { inst, op, lhs, rhs }),
            _ => None,
        }
    }

    fn inst(&self) -> InstRef {
        self.inst
    }
}

/// A direct call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallView {
    pub inst: InstRef,
    pub callee: FuncRef,
}

impl CallView {
    pub fn args<'m>(&self, module: &'m Module) -> &'m [ValueRef] {
        &module.inst_operands(self.inst)[1..]
    }
}

impl InstView for CallView {
    fn from_inst(module: &Module, inst: InstRef) -> Option<Self> {
        if *module.inst(inst).kind() != InstKind::Call {
            return None;
        }
        let &callee = module.inst_operands(inst).first()?;
        match module.value_def(callee) {
            ValueDef::Func(callee) => Some(Self { inst, callee }),
            _ => None,
        }
    }

    fn inst(&self) -> InstRef {
        self.inst
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReturnView {
    pub inst: InstRef,
    pub value: Option<ValueRef>,
}

impl InstView for ReturnView {
    fn from_inst(module: &Module, inst: InstRef) -> Option<Self> {
        if *module.inst(inst).kind() != InstKind::Return {
            return None;
        }
        match *module.inst_operands(inst) {
            [] => Some(Self { inst, value: None }),
            [value] => Some(Self {
                inst,
                value: Some(value),
            }),
            _ => None,
        }
    }

    fn inst(&self) -> InstRef {
        self.inst
    }
}

impl Module {
    /// Shorthand for `BinaryOpView::from_inst`.
    pub fn as_binary_op(&self, inst: InstRef) -> Option<BinaryOpView> {
        BinaryOpView::from_inst(self, inst)
    }
}
