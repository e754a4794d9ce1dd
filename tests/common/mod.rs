//! Shared helpers for integration tests.

#![allow(dead_code)]

use graft::ir::{BinaryOp, InstRef, Module, ValueRef, validate_module};

/// Every forward operand edge as `(user, slot, target)`.
pub fn operand_edges(module: &Module) -> Vec<(InstRef, usize, ValueRef)> {
    module
        .instructions()
        .flat_map(|(_, _, inst)| {
            module
                .inst_operands(inst)
                .iter()
                .enumerate()
                .map(move |(slot, &value)| (inst, slot, value))
        })
        .collect()
}

/// Placed binary operators in canonical order.
pub fn binary_ops(module: &Module) -> Vec<(InstRef, BinaryOp)> {
    module
        .instructions()
        .filter_map(|(_, _, inst)| module.as_binary_op(inst).map(|view| (inst, view.op)))
        .collect()
}

#[track_caller]
pub fn assert_consistent(module: &Module) {
    let result = validate_module(module);
    assert!(result.is_ok(), "{result}");
}
