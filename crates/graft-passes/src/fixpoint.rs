//! Rerun a pass until it stops changing the module.

use graft_ir::Module;
use tracing::{debug, warn};

use crate::error::PassError;
use crate::pass::{ModulePass, Preservation};

/// Configuration for [`Fixpoint`].
#[derive(Clone, Copy, Debug)]
pub struct FixpointConfig {
    /// Maximum number of inner runs. 0 means the default.
    pub max_iterations: usize,
}

impl Default for FixpointConfig {
    fn default() -> Self {
        Self { max_iterations: 16 }
    }
}

impl FixpointConfig {
    fn effective_max(&self) -> usize {
        if self.max_iterations == 0 {
            Self::default().max_iterations
        } else {
            self.max_iterations
        }
    }
}

/// Summary of the last [`Fixpoint`] run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixpointResult {
    /// Inner runs performed, including the final non-mutating one.
    pub iterations: usize,
    /// Whether the inner pass eventually reported `AllPreserved`.
    pub reached_fixpoint: bool,
}

/// Wraps a pass and reruns it until it reports `AllPreserved`.
pub struct Fixpoint<P> {
    inner: P,
    /// `fixpoint(<inner>)`
    name: String,
    config: FixpointConfig,
    last: Option<FixpointResult>,
}

impl<P: ModulePass> Fixpoint<P> {
    pub fn new(inner: P) -> Self {
        Self::with_config(inner, FixpointConfig::default())
    }

    pub fn with_config(inner: P, config: FixpointConfig) -> Self {
        Self {
            name: format!("fixpoint({})", inner.name()),
            inner,
            config,
            last: None,
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn last_result(&self) -> Option<FixpointResult> {
        self.last
    }
}

impl<P: ModulePass> ModulePass for Fixpoint<P> {
    fn run(&mut self, module: &mut Module) -> Result<Preservation, PassError> {
        let max = self.config.effective_max();
        let mut verdict = Preservation::AllPreserved;
        let mut result = FixpointResult::default();

        while result.iterations < max {
            result.iterations += 1;
            let step = self.inner.run(module)?;
            if step.is_all() {
                result.reached_fixpoint = true;
                break;
            }
            verdict = verdict.intersect(step);
        }

        if result.reached_fixpoint {
            debug!(pass = self.inner.name(), iterations = result.iterations, "fixpoint reached");
        } else {
            warn!(
                pass = self.inner.name(),
                max_iterations = max,
                "fixpoint not reached before iteration limit"
            );
        }
        self.last = Some(result);
        Ok(verdict)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
