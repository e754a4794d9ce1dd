//! The two reference scenarios over `foo(a, b) = add a, b`.

mod common;

use common::{assert_consistent, operand_edges};
use graft::ir::{
    BinaryOp, CallView, InstView, ReturnView, Signature, Type, ValueDef, first_match,
};
use graft::passes::{InstrumentationPass, LOG_BIN_OP, ModulePass, OperatorRewritePass, Preservation};
use graft::sample;

#[test]
fn test_operator_rewrite_scenario() {
    let mut module = sample::scenario().unwrap();
    let (add, _) = common::binary_ops(&module)[0];
    let old = module.inst_result(add);

    let verdict = OperatorRewritePass::new().run(&mut module).unwrap();
    assert_eq!(verdict, Preservation::NonePreserved);
    assert_consistent(&module);

    // the return now reads the new multiplication
    let ret = first_match::<ReturnView>(&module).unwrap();
    let returned = ret.value.unwrap();
    let ValueDef::Inst(mul) = module.value_def(returned) else {
        panic!("return operand is not an instruction result");
    };
    let mul = module.as_binary_op(mul).unwrap();
    assert_eq!(mul.op, BinaryOp::Mul);
    let foo = module.lookup_function("foo").unwrap();
    assert_eq!((mul.lhs, mul.rhs), (module.func_param(foo, 0), module.func_param(foo, 1)));

    // the original add is dead
    assert!(!module.has_uses(old));
    assert!(operand_edges(&module).iter().all(|&(_, _, v)| v != old));

    insta::assert_snapshot!(module.to_string(), @r"
    ; module demo
    define i32 @foo(i32 %a, i32 %b) {
    bb0:
      %0 = mul i32 %a, %b
      %r = add i32 %a, %b
      ret i32 %0
    }
    ");
}

#[test]
fn test_instrumentation_scenario() {
    let mut module = sample::scenario().unwrap();
    assert_eq!(module.external_declarations().count(), 0);

    let verdict = InstrumentationPass::new().run(&mut module).unwrap();
    assert_eq!(verdict, Preservation::NonePreserved);
    assert_consistent(&module);

    let decls: Vec<(String, Signature)> = module
        .external_declarations()
        .map(|(name, sig)| (name.to_owned(), sig.clone()))
        .collect();
    assert_eq!(
        decls,
        vec![(LOG_BIN_OP.to_owned(), Signature::new([Type::I32], Type::Void))]
    );

    let call = first_match::<CallView>(&module).unwrap();
    let (add, _) = common::binary_ops(&module)[0];
    assert_eq!(call.args(&module), &[module.inst_result(add)]);
    assert!(CallView::matches(&module, call.inst()));

    insta::assert_snapshot!(module.to_string(), @r"
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
fn test_rewrite_then_instrument() {
    let mut module = sample::scenario().unwrap();
    OperatorRewritePass::new().run(&mut module).unwrap();
    InstrumentationPass::new().run(&mut module).unwrap();
    assert_consistent(&module);

    // instrumentation finds the new mul first
    insta::assert_snapshot!(module.to_string(), @r"
    ; module demo
    define i32 @foo(i32 %a, i32 %b) {
    bb0:
      %0 = mul i32 %a, %b
      call void @logBinOp(i32 %0)
      %r = add i32 %a, %b
      ret i32 %0
    }

    declare void @logBinOp(i32)
    ");
}
