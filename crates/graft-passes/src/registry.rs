//! Plugin registry.
//!
//! The host constructs a [`PassRegistry`] once and hands it to each plugin.
//! A plugin contributes named pass factories and pipeline-start hooks inside
//! [`PassRegistry::register_plugin`]. Its contributions are staged and merged
//! only when every check passes, so a rejected plugin leaves the registry as
//! it was.

use tracing::debug;

use crate::error::RegistryError;
use crate::fixpoint::{Fixpoint, FixpointConfig};
use crate::manager::PassManager;
use crate::pass::ModulePass;
use crate::scan::MutationOutcome;

/// Version of the plugin interface provided by this host.
pub const PASS_PLUGIN_API_VERSION: u32 = 1;

/// Metadata a plugin presents at registration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluginInfo {
    pub api_version: u32,
    pub name: String,
    pub version: String,
}

impl PluginInfo {
    /// Metadata targeting the current [`PASS_PLUGIN_API_VERSION`].
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            api_version: PASS_PLUGIN_API_VERSION,
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Knobs applied to every pass a pipeline instantiates.
#[derive(Clone, Copy, Debug, Default)]
pub struct PipelineOptions {
    /// Scan behaviour after a mutation.
    pub outcome: MutationOutcome,
    /// Wrap every pass in [`Fixpoint`] with this configuration.
    pub fixpoint: Option<FixpointConfig>,
}

impl PipelineOptions {
    /// Box `pass`, wrapped in a fixpoint driver when one is configured.
    pub fn wrap(&self, pass: impl ModulePass + 'static) -> Box<dyn ModulePass> {
        match self.fixpoint {
            Some(config) => Box::new(Fixpoint::with_config(pass, config)),
            None => Box::new(pass),
        }
    }
}

pub type PassFactory = Box<dyn Fn(&PipelineOptions) -> Box<dyn ModulePass>>;
pub type PipelineStartHook = Box<dyn Fn(&mut PassManager, &PipelineOptions)>;

/// Contributions collected from one plugin before they are merged.
#[derive(Default)]
pub struct PluginSetup {
    passes: Vec<(String, PassFactory)>,
    start_hooks: Vec<PipelineStartHook>,
}

impl PluginSetup {
    /// Make a pass constructible by name in textual pipelines.
    pub fn register_pass<P, F>(&mut self, name: impl Into<String>, factory: F)
    where
        P: ModulePass + 'static,
        F: Fn(&PipelineOptions) -> P + 'static,
    {
        self.passes.push((
            name.into(),
            Box::new(move |options| Box::new(factory(options)) as Box<dyn ModulePass>),
        ));
    }

    /// Add passes to every pipeline built with [`PassRegistry::build_pipeline`].
    pub fn on_pipeline_start(&mut self, hook: impl Fn(&mut PassManager, &PipelineOptions) + 'static) {
        self.start_hooks.push(Box::new(hook));
    }
}

#[derive(Default)]
pub struct PassRegistry {
    plugins: Vec<PluginInfo>,
    passes: Vec<(String, PassFactory)>,
    start_hooks: Vec<PipelineStartHook>,
}

impl PassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin.
    ///
    /// Fails with `ApiVersionMismatch` before `setup` runs when the plugin was
    /// built against another interface version, and with `DuplicatePass` when
    /// it names a pass that is already registered.
    pub fn register_plugin(
        &mut self,
        info: PluginInfo,
        setup: impl FnOnce(&mut PluginSetup),
    ) -> Result<(), RegistryError> {
        if info.api_version != PASS_PLUGIN_API_VERSION {
            return Err(RegistryError::ApiVersionMismatch {
                plugin: info.name,
                expected: PASS_PLUGIN_API_VERSION,
                found: info.api_version,
            });
        }

        let mut staged = PluginSetup::default();
        setup(&mut staged);

        for (idx, (name, _)) in staged.passes.iter().enumerate() {
            let seen_before = staged.passes[..idx].iter().any(|(n, _)| n == name);
            if seen_before || self.contains_pass(name) {
                return Err(RegistryError::DuplicatePass(name.clone()));
            }
        }

        debug!(
            plugin = %info.name,
            version = %info.version,
            passes = staged.passes.len(),
            hooks = staged.start_hooks.len(),
            "registered plugin"
        );
        self.passes.extend(staged.passes);
        self.start_hooks.extend(staged.start_hooks);
        self.plugins.push(info);
        Ok(())
    }

    pub fn plugins(&self) -> &[PluginInfo] {
        &self.plugins
    }

    /// Registered pass names in registration order.
    pub fn pass_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.passes.iter().map(|(name, _)| name.as_str())
    }

    pub fn contains_pass(&self, name: &str) -> bool {
        self.passes.iter().any(|(n, _)| n == name)
    }

    /// Instantiate a registered pass.
    pub fn create_pass(
        &self,
        name: &str,
        options: &PipelineOptions,
    ) -> Result<Box<dyn ModulePass>, RegistryError> {
        self.passes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, factory)| factory(options))
            .ok_or_else(|| RegistryError::UnknownPass(name.to_owned()))
    }

    /// Assemble the default pipeline by running every pipeline-start hook in
    /// registration order.
    pub fn build_pipeline(&self, options: &PipelineOptions) -> PassManager {
        let mut pm = PassManager::new();
        for hook in &self.start_hooks {
            hook(&mut pm, options);
        }
        pm
    }

    /// Build a pipeline from text such as `rewrite-binop,fixpoint(instrument-binop)`.
    ///
    /// Entries are comma-separated pass names. `fixpoint(name)` wraps one pass
    /// in a [`Fixpoint`] driver. Whitespace around entries is ignored and an
    /// empty string yields an empty pipeline.
    pub fn parse_pipeline(
        &self,
        text: &str,
        options: &PipelineOptions,
    ) -> Result<PassManager, RegistryError> {
        let mut pm = PassManager::new();
        if text.trim().is_empty() {
            return Ok(pm);
        }

        let malformed = || RegistryError::MalformedPipeline(text.to_owned());
        for entry in split_top_level(text).ok_or_else(malformed)? {
            let entry = entry.trim();
            if entry.is_empty() {
                return Err(malformed());
            }

            let pass: Box<dyn ModulePass> = match entry.strip_prefix("fixpoint(") {
                Some(rest) => {
                    let inner = rest.strip_suffix(')').ok_or_else(malformed)?.trim();
                    if inner.is_empty() || inner.contains(['(', ')', ',']) {
                        return Err(malformed());
                    }
                    let config = options.fixpoint.unwrap_or_default();
                    Box::new(Fixpoint::with_config(self.create_pass(inner, options)?, config))
                }
                None if entry.contains(['(', ')']) => return Err(malformed()),
                None => options.wrap(self.create_pass(entry, options)?),
            };
            pm.add_boxed(pass);
        }

        debug!(pipeline = text, passes = pm.len(), "parsed pipeline");
        Ok(pm)
    }
}

/// Split on commas that are not inside parentheses. `None` when the
/// parentheses are unbalanced.
fn split_top_level(text: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                parts.push(&text[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(&text[start..]);
    Some(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PassError;
    use crate::pass::Preservation;
    use graft_ir::Module;

    struct Named(&'static str);

    impl ModulePass for Named {
        fn run(&mut self, _module: &mut Module) -> Result<Preservation, PassError> {
            Ok(Preservation::AllPreserved)
        }

        fn name(&self) -> &str {
            self.0
        }
    }

    fn registry() -> PassRegistry {
        let mut registry = PassRegistry::new();
        registry
            .register_plugin(PluginInfo::new("test", "v1"), |setup| {
                setup.register_pass("a", |_| Named("a"));
                setup.register_pass("b", |_| Named("b"));
                setup.on_pipeline_start(|pm, options| pm.add_boxed(options.wrap(Named("b"))));
            })
            .unwrap();
        registry
    }

    fn names(pm: &PassManager) -> Vec<&str> {
        pm.pass_names().collect()
    }

    #[test]
    fn version_mismatch_is_rejected_before_setup() {
        let mut registry = PassRegistry::new();
        let info = PluginInfo {
            api_version: PASS_PLUGIN_API_VERSION + 1,
            ..PluginInfo::new("future", "v9")
        };
        let mut ran = false;
        let err = registry
            .register_plugin(info, |_| ran = true)
            .unwrap_err();

        assert_eq!(
            err,
            RegistryError::ApiVersionMismatch {
                plugin: "future".into(),
                expected: PASS_PLUGIN_API_VERSION,
                found: PASS_PLUGIN_API_VERSION + 1,
            }
        );
        assert!(!ran);
        assert!(registry.plugins().is_empty());
    }

    #[test]
    fn duplicate_pass_rejects_whole_plugin() {
        let mut registry = registry();
        let err = registry
            .register_plugin(PluginInfo::new("clash", "v1"), |setup| {
                setup.register_pass("c", |_| Named("c"));
                setup.register_pass("a", |_| Named("a"));
                setup.on_pipeline_start(|pm, _| pm.add_pass(Named("c")));
            })
            .unwrap_err();

        assert_eq!(err, RegistryError::DuplicatePass("a".into()));
        assert_eq!(registry.plugins().len(), 1);
        assert!(!registry.contains_pass("c"));
        assert_eq!(names(&registry.build_pipeline(&PipelineOptions::default())), vec!["b"]);
    }

    #[test]
    fn duplicate_within_one_plugin() {
        let mut registry = PassRegistry::new();
        let err = registry
            .register_plugin(PluginInfo::new("twice", "v1"), |setup| {
                setup.register_pass("x", |_| Named("x"));
                setup.register_pass("x", |_| Named("x"));
            })
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicatePass("x".into()));
        assert_eq!(registry.pass_names().count(), 0);
    }

    #[test]
    fn build_pipeline_runs_hooks() {
        let registry = registry();
        let options = PipelineOptions::default();
        assert_eq!(names(&registry.build_pipeline(&options)), vec!["b"]);

        let iterating = PipelineOptions {
            fixpoint: Some(FixpointConfig::default()),
            ..options
        };
        assert_eq!(names(&registry.build_pipeline(&iterating)), vec!["fixpoint(b)"]);
    }

    #[test]
    fn parse_pipeline_resolves_names() {
        let registry = registry();
        let options = PipelineOptions::default();

        let pm = registry.parse_pipeline(" a , fixpoint( b ),a", &options).unwrap();
        assert_eq!(names(&pm), vec!["a", "fixpoint(b)", "a"]);

        assert!(registry.parse_pipeline("", &options).unwrap().is_empty());
    }

    #[test]
    fn parse_pipeline_errors() {
        let registry = registry();
        let options = PipelineOptions::default();
        let err = |text: &str| registry.parse_pipeline(text, &options).err();

        assert_eq!(err("a,zzz"), Some(RegistryError::UnknownPass("zzz".into())));
        assert_eq!(err("fixpoint(zzz)"), Some(RegistryError::UnknownPass("zzz".into())));
        for bad in ["a,,b", "fixpoint(a", "fixpoint()", "a)", "loop(a)", "fixpoint(a,b)"] {
            assert_eq!(
                err(bad),
                Some(RegistryError::MalformedPipeline(bad.into())),
                "input {bad:?}"
            );
        }
    }
}
