//! The pass protocol.
//!
//! A pass is a function from a module to a preservation verdict. It may
//! mutate the module in place and must report `NonePreserved` exactly when it
//! did.

use derive_more::Display;
use graft_ir::Module;

use crate::error::PassError;

/// Whether analyses computed before a pass are still valid after it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
pub enum Preservation {
    #[default]
    #[display("all preserved")]
    AllPreserved,
    #[display("none preserved")]
    NonePreserved,
}

impl Preservation {
    pub fn from_changed(changed: bool) -> Self {
        if changed {
            Preservation::NonePreserved
        } else {
            Preservation::AllPreserved
        }
    }

    pub fn is_all(self) -> bool {
        self == Preservation::AllPreserved
    }

    /// Logical AND over "preserved": any `NonePreserved` wins.
    pub fn intersect(self, other: Preservation) -> Preservation {
        Self::from_changed(!(self.is_all() && other.is_all()))
    }
}

/// A transformation over a whole module.
pub trait ModulePass {
    /// Run the pass, mutating `module` in place.
    fn run(&mut self, module: &mut Module) -> Result<Preservation, PassError>;

    /// Name used in logs, reports and textual pipelines.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<P: ModulePass + ?Sized> ModulePass for Box<P> {
    fn run(&mut self, module: &mut Module) -> Result<Preservation, PassError> {
        (**self).run(module)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Preservation::*;

    #[test]
    fn intersect_is_and_over_preserved() {
        assert_eq!(AllPreserved.intersect(AllPreserved), AllPreserved);
        assert_eq!(AllPreserved.intersect(NonePreserved), NonePreserved);
        assert_eq!(NonePreserved.intersect(AllPreserved), NonePreserved);
        assert_eq!(NonePreserved.intersect(NonePreserved), NonePreserved);
    }

    #[test]
    fn boxed_pass_delegates() {
        struct Touch;
        impl ModulePass for Touch {
            fn run(&mut self, _module: &mut Module) -> Result<Preservation, PassError> {
                Ok(NonePreserved)
            }

            fn name(&self) -> &str {
                "touch"
            }
        }

        let mut boxed: Box<dyn ModulePass> = Box::new(Touch);
        let mut module = Module::new("m");
        assert_eq!(boxed.name(), "touch");
        assert_eq!(boxed.run(&mut module), Ok(NonePreserved));
    }
}
