//! Use-list and ownership consistency checks.
//!
//! The mutation engine keeps these invariants by construction; the checks
//! exist for tests and for hosts that want to assert them after a pipeline:
//!
//! 1. Every operand slot has exactly one matching entry in its value's
//!    use-list, and every use-list entry names a slot that holds that value.
//! 2. An instruction placed in a block appears in that block exactly once
//!    and in no other block.

use std::collections::BTreeMap;
use std::fmt;

use derive_more::Display;

use crate::module::{Module, Use};
use crate::refs::{BlockRef, InstRef, ValueRef};

/// A single broken invariant.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum IntegrityError {
    #[display("operand #{operand_index} of {user} uses {value}, but {value} has no use entry for it")]
    MissingUse {
        value: ValueRef,
        user: InstRef,
        operand_index: u32,
    },
    #[display("{value} lists the use by {user} operand #{operand_index} {count} times")]
    DuplicateUse {
        value: ValueRef,
        user: InstRef,
        operand_index: u32,
        count: usize,
    },
    #[display("{value} lists a use by {user} operand #{operand_index}, but that slot holds another value")]
    StaleUse {
        value: ValueRef,
        user: InstRef,
        operand_index: u32,
    },
    #[display("{inst} names {block} as its parent, but the block does not contain it")]
    OrphanedInst { inst: InstRef, block: BlockRef },
    #[display("{inst} appears in {block} without being owned by it")]
    MisplacedInst { inst: InstRef, block: BlockRef },
    #[display("{inst} appears {count} times across blocks")]
    DuplicatedInst { inst: InstRef, count: usize },
}

/// Result of validation.
pub struct ValidationResult {
    pub errors: Vec<IntegrityError>,
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return write!(f, "validation passed");
        }
        writeln!(f, "{} integrity error(s) found:", self.errors.len())?;
        for err in &self.errors {
            writeln!(f, "  - {err}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Check use-lists and block ownership across the whole module, including
/// instructions that were built but never placed.
pub fn validate_module(module: &Module) -> ValidationResult {
    let mut errors = Vec::new();
    check_use_lists(module, &mut errors);
    check_ownership(module, &mut errors);
    ValidationResult { errors }
}

fn check_use_lists(module: &Module, errors: &mut Vec<IntegrityError>) {
    // Direction 1: operand slot → exactly one use entry
    for inst in module.insts.keys() {
        for (idx, &value) in module.inst_operands(inst).iter().enumerate() {
            let slot = Use {
                user: inst,
                operand_index: idx as u32,
            };
            match module.uses(value).iter().filter(|u| **u == slot).count() {
                0 => errors.push(IntegrityError::MissingUse {
                    value,
                    user: inst,
                    operand_index: slot.operand_index,
                }),
                1 => {}
                count => errors.push(IntegrityError::DuplicateUse {
                    value,
                    user: inst,
                    operand_index: slot.operand_index,
                    count,
                }),
            }
        }
    }

    // Direction 2: use entry → slot holding the value
    for value in module.values.keys() {
        for u in module.uses(value) {
            let holds = module
                .inst_operands(u.user)
                .get(u.operand_index as usize)
                .is_some_and(|&v| v == value);
            if !holds {
                errors.push(IntegrityError::StaleUse {
                    value,
                    user: u.user,
                    operand_index: u.operand_index,
                });
            }
        }
    }
}

fn check_ownership(module: &Module, errors: &mut Vec<IntegrityError>) {
    let mut seen: BTreeMap<InstRef, usize> = BTreeMap::new();
    for (block, data) in module.blocks.iter() {
        for &inst in data.insts() {
            *seen.entry(inst).or_default() += 1;
            if module.inst(inst).parent_block() != Some(block) {
                errors.push(IntegrityError::MisplacedInst { inst, block });
            }
        }
    }

    for (inst, data) in module.insts.iter() {
        if let Some(block) = data.parent_block() {
            if !module.block_insts(block).contains(&inst) {
                errors.push(IntegrityError::OrphanedInst { inst, block });
            }
        }
    }

    for (inst, count) in seen {
        if count > 1 {
            errors.push(IntegrityError::DuplicatedInst { inst, count });
        }
    }
}
