//! Replace a binary operator's result with a multiplication of its operands.
//!
//! For `%r = add i32 %a, %b` the pass inserts `%m = mul i32 %a, %b` directly
//! before the original and redirects every use of `%r` to `%m`. The original
//! instruction stays in its block with no uses.

use graft_ir::{BinaryOp, Module};
use tracing::debug;

use crate::error::PassError;
use crate::pass::{ModulePass, Preservation};
use crate::scan::{MutationOutcome, Step, scan_binary_ops};

#[derive(Clone, Copy, Debug, Default)]
pub struct OperatorRewritePass {
    outcome: MutationOutcome,
}

impl OperatorRewritePass {
    pub const NAME: &'static str = "rewrite-binop";

    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrite every binary operator present when the pass starts.
    pub fn exhaustive() -> Self {
        Self {
            outcome: MutationOutcome::ContinueScan,
        }
    }

    pub fn with_outcome(outcome: MutationOutcome) -> Self {
        Self { outcome }
    }
}

impl ModulePass for OperatorRewritePass {
    fn run(&mut self, module: &mut Module) -> Result<Preservation, PassError> {
        let outcome = self.outcome;
        scan_binary_ops(module, |module, view| {
            debug!(inst = ?view.inst, op = %view.op, "rewriting binary op to mul");
            let mul = module.create_binary_op(BinaryOp::Mul, view.lhs, view.rhs)?;
            module.insert_before(view.inst, mul)?;
            let old = module.inst_result(view.inst);
            let new = module.inst_result(mul);
            module.replace_all_uses(old, new)?;
            Ok(Step::Mutated(outcome))
        })
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}
