//! Mutation engine.
//!
//! Every operation here is transactional at call granularity: arguments are
//! validated before anything is written, so an `Err` leaves the module
//! exactly as it was. On success the use-lists match the operand slots.

use cranelift_entity::EntityList;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::{IrError, Result, Violation};
use crate::module::{BinaryOp, InstData, InstKind, Module, Use, ValueData};
use crate::refs::*;
use crate::types::{CallConv, Signature, Type};

/// Where to splice relative to an anchor instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Placement {
    Before,
    After,
}

impl Module {
    // ========================================================================
    // Build
    // ========================================================================

    /// Allocate a detached instruction and register its operand uses.
    fn push_inst(&mut self, kind: InstKind, operands: &[ValueRef], ty: Type) -> InstRef {
        let inst = self.insts.next_key();
        let result = self.values.push(ValueData {
            def: ValueDef::Inst(inst),
            ty,
            name: None,
        });

        let mut list = EntityList::new();
        for &v in operands {
            list.push(v, &mut self.value_pool);
        }
        let pushed = self.insts.push(InstData {
            kind,
            operands: list,
            ty,
            result,
            parent_block: None,
        });
        debug_assert_eq!(pushed, inst);

        for (idx, &v) in operands.iter().enumerate() {
            self.uses[v].push(Use {
                user: inst,
                operand_index: idx as u32,
            });
        }
        trace!(%inst, operands = operands.len(), "created instruction");
        inst
    }

    /// Build a binary operator over `lhs` and `rhs`.
    ///
    /// The instruction is not placed; use [`Module::insert_before`],
    /// [`Module::insert_after`] or [`Module::append_inst`].
    pub fn create_binary_op(
        &mut self,
        op: BinaryOp,
        lhs: ValueRef,
        rhs: ValueRef,
    ) -> Result<InstRef> {
        let lhs_ty = self.value_ty(lhs);
        let rhs_ty = self.value_ty(rhs);
        if lhs_ty != rhs_ty {
            return Err(IrError::TypeMismatch {
                site: format!("operands of `{op}`"),
                expected: lhs_ty,
                found: rhs_ty,
            });
        }
        Ok(self.push_inst(InstKind::Binary(op), &[lhs, rhs], lhs_ty))
    }

    /// Build a call to `callee` after checking `args` against its signature.
    ///
    /// Variadic callees accept any number of extra arguments of any type.
    pub fn create_call(&mut self, callee: FuncRef, args: &[ValueRef]) -> Result<InstRef> {
        let data = self.func(callee);
        let sig = data.signature();

        let arity_ok = if sig.variadic {
            args.len() >= sig.params.len()
        } else {
            args.len() == sig.params.len()
        };
        if !arity_ok {
            return Err(IrError::ArityMismatch {
                callee: data.name().to_owned(),
                expected: sig.params.len(),
                found: args.len(),
            });
        }

        for (idx, (&arg, &expected)) in args.iter().zip(sig.params.iter()).enumerate() {
            let found = self.value_ty(arg);
            if found != expected {
                return Err(IrError::TypeMismatch {
                    site: format!("argument {idx} of call to `{}`", data.name()),
                    expected,
                    found,
                });
            }
        }

        let ret = sig.ret;
        let mut operands: SmallVec<[ValueRef; 8]> = SmallVec::with_capacity(args.len() + 1);
        operands.push(self.func_value(callee));
        operands.extend_from_slice(args);
        Ok(self.push_inst(InstKind::Call, &operands, ret))
    }

    /// Build a return, with or without a value.
    pub fn create_return(&mut self, value: Option<ValueRef>) -> InstRef {
        let operands: &[ValueRef] = match &value {
            Some(v) => std::slice::from_ref(v),
            None => &[],
        };
        self.push_inst(InstKind::Return, operands, Type::Void)
    }

    /// Build an instruction with an opcode the engine does not interpret.
    pub fn create_opaque(
        &mut self,
        opcode: impl Into<String>,
        operands: &[ValueRef],
        ty: Type,
    ) -> InstRef {
        self.push_inst(InstKind::Other(opcode.into()), operands, ty)
    }

    /// Return the function named `name`, declaring it if it does not exist.
    ///
    /// A second call with the same signature returns the same `FuncRef`.
    /// An existing function with a different signature is a conflict, whether
    /// it is a declaration or a definition.
    pub fn get_or_declare_function(&mut self, name: &str, sig: Signature) -> Result<FuncRef> {
        if let Some(existing) = self.lookup_function(name) {
            let existing_sig = self.func(existing).signature();
            if *existing_sig != sig {
                return Err(IrError::SignatureConflict {
                    name: name.to_owned(),
                    existing: existing_sig.clone(),
                    requested: sig,
                });
            }
            return Ok(existing);
        }

        let func = self.add_function(name, sig, CallConv::C)?;
        debug!(%func, name, "declared external function");
        Ok(func)
    }

    // ========================================================================
    // Operand edges
    // ========================================================================

    /// Replace all uses of `old` with `new`.
    ///
    /// Updates both operand lists and use-lists; afterwards `old` has no uses.
    pub fn replace_all_uses(&mut self, old: ValueRef, new: ValueRef) -> Result<()> {
        if old == new {
            return Err(IrError::SelfReplacement(old));
        }

        let old_uses = std::mem::take(&mut self.uses[old]);
        trace!(%old, %new, count = old_uses.len(), "replace all uses");

        for u in &old_uses {
            let slice = self.insts[u.user]
                .operands
                .as_mut_slice(&mut self.value_pool);
            debug_assert_eq!(slice[u.operand_index as usize], old);
            slice[u.operand_index as usize] = new;

            self.uses[new].push(*u);
        }
        Ok(())
    }

    /// Point a single operand slot at `value`.
    pub fn set_operand(&mut self, inst: InstRef, index: u32, value: ValueRef) -> Result<()> {
        let old = match self.inst_operands(inst).get(index as usize) {
            Some(&old) => old,
            None => return Err(IrError::OperandOutOfRange { inst, index }),
        };
        if old == value {
            return Ok(());
        }

        let slot = Use {
            user: inst,
            operand_index: index,
        };
        self.uses[old].retain(|u| *u != slot);
        self.insts[inst].operands.as_mut_slice(&mut self.value_pool)[index as usize] = value;
        self.uses[value].push(slot);
        Ok(())
    }

    // ========================================================================
    // Placement
    // ========================================================================

    /// Splice `inst` into `anchor`'s block immediately before `anchor`.
    pub fn insert_before(&mut self, anchor: InstRef, inst: InstRef) -> Result<()> {
        self.insert_relative(anchor, inst, Placement::Before)
    }

    /// Splice `inst` into `anchor`'s block immediately after `anchor`.
    pub fn insert_after(&mut self, anchor: InstRef, inst: InstRef) -> Result<()> {
        self.insert_relative(anchor, inst, Placement::After)
    }

    fn insert_relative(&mut self, anchor: InstRef, inst: InstRef, at: Placement) -> Result<()> {
        if let Some(block) = self.insts[inst].parent_block {
            return Err(Violation::AlreadyPlaced { inst, block }.into());
        }
        let Some(block) = self.insts[anchor].parent_block else {
            return Err(Violation::DetachedAnchor(anchor).into());
        };
        let Some(pos) = self.blocks[block].insts.iter().position(|&i| i == anchor) else {
            return Err(Violation::DetachedAnchor(anchor).into());
        };

        let index = match at {
            Placement::Before => pos,
            Placement::After => pos + 1,
        };
        self.blocks[block].insts.insert(index, inst);
        self.insts[inst].parent_block = Some(block);
        trace!(%inst, %anchor, %block, ?at, "inserted instruction");
        Ok(())
    }
}
