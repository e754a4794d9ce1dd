//! Pipeline driver.

use graft_ir::Module;
use tracing::debug;

use crate::error::PipelineError;
use crate::pass::{ModulePass, Preservation};

/// One pass's verdict within a pipeline run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassRecord {
    pub name: String,
    pub verdict: Preservation,
}

/// Outcome of a full pipeline run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Intersection of every pass verdict.
    pub preserved: Preservation,
    /// Per-pass verdicts, in execution order.
    pub passes: Vec<PassRecord>,
}

impl PipelineReport {
    pub fn changed(&self) -> bool {
        !self.preserved.is_all()
    }
}

/// Ordered list of passes, each run exactly once per `run`.
#[derive(Default)]
pub struct PassManager {
    passes: Vec<Box<dyn ModulePass>>,
}

impl PassManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pass(&mut self, pass: impl ModulePass + 'static) {
        self.passes.push(Box::new(pass));
    }

    pub fn add_boxed(&mut self, pass: Box<dyn ModulePass>) {
        self.passes.push(pass);
    }

    pub fn with_pass(mut self, pass: impl ModulePass + 'static) -> Self {
        self.add_pass(pass);
        self
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn pass_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.passes.iter().map(|pass| pass.name())
    }

    /// Run every pass once, in order.
    ///
    /// The first failure stops the run. Passes that already ran keep their
    /// changes, and their verdicts travel in [`PipelineError::report`]; the
    /// failing pass leaves the module consistent but possibly partially
    /// rewritten.
    pub fn run(&mut self, module: &mut Module) -> Result<PipelineReport, PipelineError> {
        let mut report = PipelineReport::default();

        for (position, pass) in self.passes.iter_mut().enumerate() {
            let name = pass.name().to_owned();
            debug!(pass = %name, position, module = module.name(), "running pass");

            let verdict = match pass.run(module) {
                Ok(verdict) => verdict,
                Err(source) => {
                    return Err(PipelineError {
                        pass: name,
                        position,
                        source,
                        report,
                    });
                }
            };

            debug!(pass = %name, %verdict, "pass finished");
            report.preserved = report.preserved.intersect(verdict);
            report.passes.push(PassRecord { name, verdict });
        }

        Ok(report)
    }
}
