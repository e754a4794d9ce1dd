//! Traversal in canonical scan order.
//!
//! Canonical order is function insertion order, then block order, then
//! instruction order. Every traversal here uses it, so two scans of the same
//! unmodified module observe the same sequence.

use std::ops::ControlFlow;

use crate::module::Module;
use crate::refs::{BlockRef, FuncRef, InstRef};
use crate::view::InstView;

/// One step of a traversal: an instruction together with its owners.
pub type InstSite = (FuncRef, BlockRef, InstRef);

impl Module {
    /// Lazily iterate all placed instructions in canonical order.
    ///
    /// The iterator borrows the module, so it cannot be held across a
    /// mutation; collect it first when a pass needs to rewrite while scanning.
    pub fn instructions(&self) -> impl Iterator<Item = InstSite> + '_ {
        self.functions().flat_map(move |func| {
            self.func(func).blocks().iter().flat_map(move |&block| {
                self.block_insts(block)
                    .iter()
                    .map(move |&inst| (func, block, inst))
            })
        })
    }
}

/// Walk all placed instructions in canonical order with early exit.
pub fn walk_insts<B>(
    module: &Module,
    f: &mut dyn FnMut(InstSite) -> ControlFlow<B>,
) -> ControlFlow<B> {
    for site in module.instructions() {
        f(site)?;
    }
    ControlFlow::Continue(())
}

/// Walk only instructions matching view `T`.
pub fn walk_typed<T, B>(
    module: &Module,
    f: &mut dyn FnMut(T) -> ControlFlow<B>,
) -> ControlFlow<B>
where
    T: InstView,
{
    walk_insts(module, &mut |(_, _, inst)| match T::from_inst(module, inst) {
        Some(typed) => f(typed),
        None => ControlFlow::Continue(()),
    })
}

/// First instruction matching view `T` in canonical order.
pub fn first_match<T: InstView>(module: &Module) -> Option<T> {
    match walk_typed::<T, T>(module, &mut |found| ControlFlow::Break(found)) {
        ControlFlow::Break(found) => Some(found),
        ControlFlow::Continue(()) => None,
    }
}
