//! Binary-operator scan shared by the concrete passes.

use graft_ir::{BinaryOpView, InstRef, Module};
use tracing::trace;

use crate::error::PassError;
use crate::pass::Preservation;

/// What a scan does after a successful mutation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MutationOutcome {
    /// End the scan after the first mutation.
    #[default]
    Stop,
    /// Keep scanning the remaining snapshot.
    ContinueScan,
}

/// Result of visiting one candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Candidate left alone.
    Skip,
    Mutated(MutationOutcome),
}

/// Visit every BinaryOp in canonical order.
///
/// The order is snapshotted before the first visit, so instructions created by
/// `visit` are never revisited. Each snapshot entry is re-checked against the
/// current module since earlier mutations may have rewritten it.
pub fn scan_binary_ops<F>(module: &mut Module, mut visit: F) -> Result<Preservation, PassError>
where
    F: FnMut(&mut Module, BinaryOpView) -> Result<Step, PassError>,
{
    let snapshot: Vec<InstRef> = module.instructions().map(|(_, _, inst)| inst).collect();
    let mut changed = false;

    for inst in snapshot {
        let Some(view) = module.as_binary_op(inst) else {
            continue;
        };
        trace!(?inst, op = %view.op, "visiting binary op");
        match visit(module, view)? {
            Step::Skip => {}
            Step::Mutated(outcome) => {
                changed = true;
                if outcome == MutationOutcome::Stop {
                    break;
                }
            }
        }
    }

    Ok(Preservation::from_changed(changed))
}
