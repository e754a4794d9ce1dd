//! The skeleton plugin: both binary-operator passes, with instrumentation
//! added at pipeline start.

use crate::error::RegistryError;
use crate::registry::{PassRegistry, PluginInfo};
use crate::transforms::{InstrumentationPass, OperatorRewritePass};

pub const PLUGIN_NAME: &str = "Skeleton pass";
pub const PLUGIN_VERSION: &str = "v0.1";

pub fn plugin_info() -> PluginInfo {
    PluginInfo::new(PLUGIN_NAME, PLUGIN_VERSION)
}

pub fn register(registry: &mut PassRegistry) -> Result<(), RegistryError> {
    registry.register_plugin(plugin_info(), |setup| {
        setup.register_pass(OperatorRewritePass::NAME, |options| {
            OperatorRewritePass::with_outcome(options.outcome)
        });
        setup.register_pass(InstrumentationPass::NAME, |options| {
            InstrumentationPass::with_outcome(options.outcome)
        });
        setup.on_pipeline_start(|pm, options| {
            pm.add_boxed(options.wrap(InstrumentationPass::with_outcome(options.outcome)));
        });
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{PASS_PLUGIN_API_VERSION, PipelineOptions};

    #[test]
    fn registers_both_passes() {
        let mut registry = PassRegistry::new();
        register(&mut registry).unwrap();

        assert_eq!(
            registry.plugins(),
            &[PluginInfo {
                api_version: PASS_PLUGIN_API_VERSION,
                name: "Skeleton pass".into(),
                version: "v0.1".into(),
            }]
        );
        assert_eq!(
            registry.pass_names().collect::<Vec<_>>(),
            vec!["rewrite-binop", "instrument-binop"]
        );
        let pm = registry.build_pipeline(&PipelineOptions::default());
        assert_eq!(pm.pass_names().collect::<Vec<_>>(), vec!["instrument-binop"]);
    }

    #[test]
    fn registering_twice_fails() {
        let mut registry = PassRegistry::new();
        register(&mut registry).unwrap();
        assert_eq!(
            register(&mut registry),
            Err(RegistryError::DuplicatePass("rewrite-binop".into()))
        );
        assert_eq!(registry.plugins().len(), 1);
    }
}
