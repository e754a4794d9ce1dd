//! Text format printer.
//!
//! Prints modules in an LLVM-like format, used for logs, the CLI and tests:
//!
//! ```text
//! ; module demo
//! define i32 @foo(i32 %a, i32 %b) {
//! bb0:
//!   %r = add i32 %a, %b
//!   call void @logBinOp(i32 %r)
//!   ret i32 %r
//! }
//!
//! declare void @logBinOp(i32)
//! ```
//!
//! Named values print as `%name`. Unnamed parameters and instruction results
//! are numbered `%0`, `%1`, ... per function in definition order. A name that
//! repeats within a function, or that is all digits, gets a `.N` suffix so it
//! collides neither with another name nor with the numbering.

use std::collections::{HashMap, HashSet};
use std::fmt::{self, Write};

use crate::module::{InstKind, Module};
use crate::refs::*;
use crate::types::CallConv;

/// Print state for value numbering within one function.
struct PrintState<'a> {
    module: &'a Module,
    value_names: HashMap<ValueRef, String>,
    used_names: HashSet<String>,
    next_value_num: usize,
}

impl<'a> PrintState<'a> {
    fn new(module: &'a Module) -> Self {
        Self {
            module,
            value_names: HashMap::new(),
            used_names: HashSet::new(),
            next_value_num: 0,
        }
    }

    fn assign_value_name(&mut self, v: ValueRef) {
        let module = self.module;
        let name = match module.value_name(v) {
            Some(name) => format!("%{}", self.unique_name(name)),
            None => {
                let name = format!("%{}", self.next_value_num);
                self.next_value_num += 1;
                name
            }
        };
        self.value_names.insert(v, name);
    }

    /// Claim `name`, suffixing it when taken or numeric.
    fn unique_name(&mut self, name: &str) -> String {
        let numeric = !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit());
        if !numeric && self.used_names.insert(name.to_owned()) {
            return name.to_owned();
        }
        let mut suffix = 1usize;
        loop {
            let candidate = format!("{name}.{suffix}");
            if self.used_names.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }

    fn reset_numbering(&mut self) {
        self.next_value_num = 0;
        self.value_names.clear();
        self.used_names.clear();
    }

    /// Render an operand without its type.
    fn operand(&self, v: ValueRef) -> String {
        match self.module.value_def(v) {
            ValueDef::Const(value) => value.to_string(),
            ValueDef::Func(func) => format!("@{}", self.module.func(func).name()),
            ValueDef::Inst(_) | ValueDef::Param(..) => self
                .value_names
                .get(&v)
                .cloned()
                .unwrap_or_else(|| "%?".to_owned()),
        }
    }

    /// Render an operand prefixed by its type.
    fn typed_operand(&self, v: ValueRef) -> String {
        format!("{} {}", self.module.value_ty(v), self.operand(v))
    }

    fn print_function(&mut self, f: &mut impl Write, func: FuncRef) -> fmt::Result {
        self.reset_numbering();
        let module = self.module;
        let data = module.func(func);
        let keyword = if data.is_declaration() {
            "declare"
        } else {
            "define"
        };
        write!(f, "{keyword} ")?;
        if data.call_conv() != CallConv::C {
            write!(f, "{} ", data.call_conv())?;
        }
        write!(f, "{} @{}(", data.return_type(), data.name())?;

        for (idx, &param) in data.params().iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            if data.is_declaration() {
                write!(f, "{}", module.value_ty(param))?;
            } else {
                self.assign_value_name(param);
                f.write_str(&self.typed_operand(param))?;
            }
        }
        if data.is_variadic() {
            f.write_str(if data.params().is_empty() { "..." } else { ", ..." })?;
        }
        f.write_str(")")?;

        if data.is_declaration() {
            return writeln!(f);
        }

        writeln!(f, " {{")?;
        for (idx, &block) in data.blocks().iter().enumerate() {
            writeln!(f, "bb{idx}:")?;
            for &inst in module.block_insts(block) {
                self.print_inst(f, inst)?;
            }
        }
        writeln!(f, "}}")
    }

    fn print_inst(&mut self, f: &mut impl Write, inst: InstRef) -> fmt::Result {
        let module = self.module;
        let data = module.inst(inst);
        let operands = module.inst_operands(inst);

        f.write_str("  ")?;
        if !data.ty().is_void() {
            self.assign_value_name(data.result());
            write!(f, "{} = ", self.operand(data.result()))?;
        }

        match data.kind() {
            InstKind::Binary(op) => {
                let rendered: Vec<String> = operands.iter().map(|&v| self.operand(v)).collect();
                write!(f, "{op} {} {}", data.ty(), rendered.join(", "))?;
            }
            InstKind::Call => {
                let (callee, args) = match operands.split_first() {
                    Some((&callee, args)) => (self.operand(callee), args),
                    None => ("@?".to_owned(), operands),
                };
                let rendered: Vec<String> = args.iter().map(|&v| self.typed_operand(v)).collect();
                write!(f, "call {} {callee}({})", data.ty(), rendered.join(", "))?;
            }
            InstKind::Return => match operands {
                [] => f.write_str("ret void")?,
                _ => {
                    let rendered: Vec<String> =
                        operands.iter().map(|&v| self.typed_operand(v)).collect();
                    write!(f, "ret {}", rendered.join(", "))?;
                }
            },
            InstKind::Other(opcode) => {
                f.write_str(opcode)?;
                if !operands.is_empty() {
                    let rendered: Vec<String> =
                        operands.iter().map(|&v| self.typed_operand(v)).collect();
                    write!(f, " {}", rendered.join(", "))?;
                }
            }
        }
        writeln!(f)
    }
}

/// Print a whole module.
pub fn print_module(module: &Module) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_module(&mut out, module);
    out
}

/// Write a whole module to any `fmt::Write` sink.
pub fn write_module(f: &mut impl Write, module: &Module) -> fmt::Result {
    let mut state = PrintState::new(module);
    writeln!(f, "; module {}", module.name())?;
    for (idx, func) in module.functions().enumerate() {
        if idx > 0 {
            writeln!(f)?;
        }
        state.print_function(f, func)?;
    }
    Ok(())
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_module(f, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::BinaryOp;
    use crate::types::{Signature, Type};

    /// `foo(a, b) = add a, b` with named values.
    fn scenario_module() -> (Module, InstRef) {
        let mut module = Module::new("demo");
        let foo = module
            .add_function(
                "foo",
                Signature::new([Type::I32, Type::I32], Type::I32),
                CallConv::C,
            )
            .unwrap();
        let entry = module.append_block(foo);
        let (a, b) = (module.func_param(foo, 0), module.func_param(foo, 1));
        module.set_value_name(a, "a");
        module.set_value_name(b, "b");
        let add = module.create_binary_op(BinaryOp::Add, a, b).unwrap();
        module.set_value_name(module.inst_result(add), "r");
        module.append_inst(entry, add).unwrap();
        let ret = module.create_return(Some(module.inst_result(add)));
        module.append_inst(entry, ret).unwrap();
        (module, add)
    }

    #[test]
    fn print_named_function() {
        let (module, _) = scenario_module();
        insta::assert_snapshot!(print_module(&module), @r"
        ; module demo
        define i32 @foo(i32 %a, i32 %b) {
        bb0:
          %r = add i32 %a, %b
          ret i32 %r
        }
        ");
    }

    #[test]
    fn print_declarations_and_calls() {
        let (mut module, add) = scenario_module();
        let log = module
            .get_or_declare_function("logBinOp", Signature::new([Type::I32], Type::Void))
            .unwrap();
        let call = module.create_call(log, &[module.inst_result(add)]).unwrap();
        module.insert_after(add, call).unwrap();

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
    fn clashing_names_get_suffixes() {
        let mut module = Module::new("names");
        let f = module
            .add_function("f", Signature::new([Type::I32, Type::I32], Type::I32), CallConv::C)
            .unwrap();
        let entry = module.append_block(f);
        let (x, y) = (module.func_param(f, 0), module.func_param(f, 1));
        module.set_value_name(x, "x");
        module.set_value_name(y, "x");
        let add = module.create_binary_op(BinaryOp::Add, x, y).unwrap();
        module.set_value_name(module.inst_result(add), "0");
        module.append_inst(entry, add).unwrap();
        let sub = module.create_binary_op(BinaryOp::Sub, module.inst_result(add), x).unwrap();
        module.append_inst(entry, sub).unwrap();
        let ret = module.create_return(Some(module.inst_result(sub)));
        module.append_inst(entry, ret).unwrap();

        insta::assert_snapshot!(print_module(&module), @r"
        ; module names
        define i32 @f(i32 %x, i32 %x.1) {
        bb0:
          %0.1 = add i32 %x, %x.1
          %0 = sub i32 %0.1, %x
          ret i32 %0
        }
        ");
    }

    #[test]
    fn unnamed_values_are_numbered_per_function() {
        let mut module = Module::new("nums");
        let sig = Signature::new([Type::I64], Type::I64);
        for name in ["first", "second"] {
            let func = module.add_function(name, sig.clone(), CallConv::Fast).unwrap();
            let entry = module.append_block(func);
            let x = module.func_param(func, 0);
            let two = module.iconst(Type::I64, 2);
            let shl = module.create_binary_op(BinaryOp::Shl, x, two).unwrap();
            module.append_inst(entry, shl).unwrap();
            let load = module.create_opaque("freeze", &[module.inst_result(shl)], Type::I64);
            module.append_inst(entry, load).unwrap();
            let ret = module.create_return(Some(module.inst_result(load)));
            module.append_inst(entry, ret).unwrap();
        }
        module
            .add_function("printf", Signature::new([Type::Ptr], Type::I32).variadic(), CallConv::C)
            .unwrap();

        insta::assert_snapshot!(print_module(&module), @r"
        ; module nums
        define fastcc i64 @first(i64 %0) {
        bb0:
          %1 = shl i64 %0, 2
          %2 = freeze i64 %1
          ret i64 %2
        }

        define fastcc i64 @second(i64 %0) {
        bb0:
          %1 = shl i64 %0, 2
          %2 = freeze i64 %1
          ret i64 %2
        }

        declare i32 @printf(ptr, ...)
        ");
    }
}
