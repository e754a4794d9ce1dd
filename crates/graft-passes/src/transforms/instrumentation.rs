//! Log binary operator results through an external hook.
//!
//! After the matched operator the pass inserts `call void @logBinOp(i32 %r)`,
//! declaring `logBinOp` on first use.

use graft_ir::{IrError, Module, Signature, Type};
use tracing::debug;

use crate::error::PassError;
use crate::pass::{ModulePass, Preservation};
use crate::scan::{MutationOutcome, Step, scan_binary_ops};

/// Name of the external logging function.
pub const LOG_BIN_OP: &str = "logBinOp";

/// Type of the single `logBinOp` argument.
const LOG_BIN_OP_ARG: Type = Type::I32;

/// `(i32) -> void`
pub fn log_bin_op_signature() -> Signature {
    Signature::new([LOG_BIN_OP_ARG], Type::Void)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct InstrumentationPass {
    outcome: MutationOutcome,
}

impl InstrumentationPass {
    pub const NAME: &'static str = "instrument-binop";

    pub fn new() -> Self {
        Self::default()
    }

    /// Instrument every binary operator present when the pass starts.
    pub fn exhaustive() -> Self {
        Self {
            outcome: MutationOutcome::ContinueScan,
        }
    }

    pub fn with_outcome(outcome: MutationOutcome) -> Self {
        Self { outcome }
    }
}

impl ModulePass for InstrumentationPass {
    fn run(&mut self, module: &mut Module) -> Result<Preservation, PassError> {
        let outcome = self.outcome;
        scan_binary_ops(module, |module, view| {
            debug!(inst = ?view.inst, op = %view.op, "instrumenting binary op");
            let result = module.inst_result(view.inst);
            // Checked before declaring so a rejected operator leaves no declaration.
            let found = module.value_ty(result);
            if found != LOG_BIN_OP_ARG {
                return Err(IrError::TypeMismatch {
                    site: format!("argument 0 of call to `{LOG_BIN_OP}`"),
                    expected: LOG_BIN_OP_ARG,
                    found,
                }
                .into());
            }
            let log = module.get_or_declare_function(LOG_BIN_OP, log_bin_op_signature())?;
            let call = module.create_call(log, &[result])?;
            module.insert_after(view.inst, call)?;
            Ok(Step::Mutated(outcome))
        })
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_ir::{BinaryOp, CallConv, CallView, InstRef, InstView, print_module, validate_module};

    fn binop_module(ty: Type, ops: &[BinaryOp]) -> (Module, Vec<InstRef>) {
        let mut module = Module::new("demo");
        let foo = module
            .add_function("foo", Signature::new([ty, ty], ty), CallConv::C)
            .unwrap();
        let entry = module.append_block(foo);
        let (a, b) = (module.func_param(foo, 0), module.func_param(foo, 1));
        module.set_value_name(a, "a");
        module.set_value_name(b, "b");
        let mut insts = Vec::new();
        let mut acc = a;
        for &op in ops {
            let inst = module.create_binary_op(op, acc, b).unwrap();
            module.append_inst(entry, inst).unwrap();
            acc = module.inst_result(inst);
            insts.push(inst);
        }
        let ret = module.create_return(Some(acc));
        module.append_inst(entry, ret).unwrap();
        (module, insts)
    }

    #[test]
    fn inserts_logging_call_after_op() {
        let (mut module, insts) = binop_module(Type::I32, &[BinaryOp::Add]);
        module.set_value_name(module.inst_result(insts[0]), "r");

        let verdict = InstrumentationPass::new().run(&mut module).unwrap();

        assert_eq!(verdict, Preservation::NonePreserved);
        assert!(validate_module(&module).is_ok());
        let log = module.lookup_function(LOG_BIN_OP).unwrap();
        assert!(module.func(log).is_declaration());
        assert_eq!(module.uses(module.inst_result(insts[0])).len(), 2);
        insta::assert_snapshot!(print_module(&module), @r"
        ; module demo
        define i32 @foo(i32 %a, i32 %b) {
        bb0:
          %r = add i32 %a, %b
          call void @logBinOp(i32 %r)
          ret i32 %r
        }

        declare void @logBinOp(i32)
        ");
    }

    #[test]
    fn no_binary_op_declares_nothing() {
        let (mut module, _) = binop_module(Type::I32, &[]);
        let verdict = InstrumentationPass::new().run(&mut module).unwrap();
        assert_eq!(verdict, Preservation::AllPreserved);
        assert_eq!(module.lookup_function(LOG_BIN_OP), None);
    }

    #[test]
    fn exhaustive_reuses_one_declaration() {
        let (mut module, insts) = binop_module(Type::I32, &[BinaryOp::Add, BinaryOp::Shl]);

        InstrumentationPass::exhaustive().run(&mut module).unwrap();

        let log = module.lookup_function(LOG_BIN_OP).unwrap();
        assert_eq!(module.function_count(), 2);
        let calls: Vec<CallView> = module
            .instructions()
            .filter_map(|(_, _, inst)| CallView::from_inst(&module, inst))
            .collect();
        assert_eq!(calls.len(), 2);
        for (call, &op) in calls.iter().zip(&insts) {
            assert_eq!(call.callee, log);
            assert_eq!(call.args(&module), &[module.inst_result(op)]);
        }
    }

    #[test]
    fn rerun_instruments_the_same_op_again() {
        let (mut module, insts) = binop_module(Type::I32, &[BinaryOp::Add]);
        InstrumentationPass::new().run(&mut module).unwrap();
        InstrumentationPass::new().run(&mut module).unwrap();

        let block = module.inst(insts[0]).parent_block().unwrap();
        let block_insts = module.block_insts(block);
        assert_eq!(block_insts.len(), 4);
        assert!(CallView::matches(&module, block_insts[1]));
        assert!(CallView::matches(&module, block_insts[2]));
    }

    #[test]
    fn non_i32_result_is_a_type_mismatch() {
        let (mut module, _) = binop_module(Type::I64, &[BinaryOp::Add]);
        let text = print_module(&module);
        let functions = module.function_count();

        let err = InstrumentationPass::new().run(&mut module).unwrap_err();

        assert!(matches!(
            err,
            PassError::Ir(IrError::TypeMismatch {
                expected: Type::I32,
                found: Type::I64,
                ..
            })
        ));
        assert_eq!(module.lookup_function(LOG_BIN_OP), None);
        assert_eq!(module.function_count(), functions);
        assert_eq!(print_module(&module), text);
        assert!(validate_module(&module).is_ok());
    }
}
