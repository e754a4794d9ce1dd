//! Built-in sample modules for the demo driver and tests.

use graft_ir::{BinaryOp, CallConv, Module, Result, Signature, Type};

/// `foo(a: i32, b: i32) -> i32` whose body chains `ops` left to right.
///
/// With `ops = [Add]` this is `%r = add i32 %a, %b; ret i32 %r`. Each
/// operator takes the previous result and `%b`; the last result is returned.
/// The first result is named `r`.
pub fn binop_chain(ops: &[BinaryOp]) -> Result<Module> {
    let mut module = Module::new("demo");
    let foo = module.add_function(
        "foo",
        Signature::new([Type::I32, Type::I32], Type::I32),
        CallConv::C,
    )?;
    let entry = module.append_block(foo);
    let (a, b) = (module.func_param(foo, 0), module.func_param(foo, 1));
    module.set_value_name(a, "a");
    module.set_value_name(b, "b");

    let mut acc = a;
    for (idx, &op) in ops.iter().enumerate() {
        let inst = module.create_binary_op(op, acc, b)?;
        module.append_inst(entry, inst)?;
        acc = module.inst_result(inst);
        if idx == 0 {
            module.set_value_name(acc, "r");
        }
    }

    let ret = module.create_return(Some(acc));
    module.append_inst(entry, ret)?;
    Ok(module)
}

/// `foo(a, b) = add a, b`
pub fn scenario() -> Result<Module> {
    binop_chain(&[BinaryOp::Add])
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_ir::validate_module;

    #[test]
    fn scenario_prints_as_expected() {
        let module = scenario().unwrap();
        assert!(validate_module(&module).is_ok());
        insta::assert_snapshot!(module.to_string(), @r"
        ; module demo
        define i32 @foo(i32 %a, i32 %b) {
        bb0:
          %r = add i32 %a, %b
          ret i32 %r
        }
        ");
    }

    #[test]
    fn empty_chain_returns_first_param() {
        let module = binop_chain(&[]).unwrap();
        insta::assert_snapshot!(module.to_string(), @r"
        ; module demo
        define i32 @foo(i32 %a, i32 %b) {
        bb0:
          ret i32 %a
        }
        ");
    }
}
