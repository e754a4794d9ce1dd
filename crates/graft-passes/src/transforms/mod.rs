//! Concrete module passes.
//!
//! Both passes target the first binary operator in canonical order by
//! default. Construct them with `exhaustive()` to rewrite every binary
//! operator present when the pass starts.

pub mod instrumentation;
pub mod operator_rewrite;

pub use instrumentation::{InstrumentationPass, LOG_BIN_OP};
pub use operator_rewrite::OperatorRewritePass;
