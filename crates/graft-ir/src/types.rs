//! Value types, function signatures and calling-convention tags.

use std::fmt;

/// First-class value types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    I1,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    /// Opaque pointer.
    Ptr,
}

impl Type {
    pub fn is_void(self) -> bool {
        self == Type::Void
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Type::I1 | Type::I8 | Type::I16 | Type::I32 | Type::I64
        )
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Type::Void => "void",
            Type::I1 => "i1",
            Type::I8 => "i8",
            Type::I16 => "i16",
            Type::I32 => "i32",
            Type::I64 => "i64",
            Type::F32 => "float",
            Type::F64 => "double",
            Type::Ptr => "ptr",
        };
        f.write_str(name)
    }
}

/// Function signature: return type, parameter types and variadic flag.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    pub params: Vec<Type>,
    pub ret: Type,
    pub variadic: bool,
}

impl Signature {
    pub fn new(params: impl IntoIterator<Item = Type>, ret: Type) -> Self {
        Self {
            params: params.into_iter().collect(),
            ret,
            variadic: false,
        }
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, ty) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{ty}")?;
        }
        if self.variadic {
            if self.params.is_empty() {
                f.write_str("...")?;
            } else {
                f.write_str(", ...")?;
            }
        }
        write!(f, ") -> {}", self.ret)
    }
}

/// Calling-convention tag. Carried through the IR, never interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CallConv {
    #[default]
    C,
    Fast,
    Cold,
    Other(u32),
}

impl CallConv {
    /// Numeric id as used by LLVM-style toolchains.
    pub fn id(self) -> u32 {
        match self {
            CallConv::C => 0,
            CallConv::Fast => 8,
            CallConv::Cold => 9,
            CallConv::Other(id) => id,
        }
    }
}

impl From<u32> for CallConv {
    fn from(id: u32) -> Self {
        match id {
            0 => CallConv::C,
            8 => CallConv::Fast,
            9 => CallConv::Cold,
            other => CallConv::Other(other),
        }
    }
}

impl fmt::Display for CallConv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallConv::C => f.write_str("ccc"),
            CallConv::Fast => f.write_str("fastcc"),
            CallConv::Cold => f.write_str("coldcc"),
            CallConv::Other(id) => write!(f, "cc {id}"),
        }
    }
}
