//! Shared construction inputs for destination managers.

use forge_core::{OverrideEngine, OverrideRule};

use crate::resource::ResourceResolver;

/// Everything a manager needs besides its own config.
///
/// `overrides` is the full rule list; each manager keeps only the rules that
/// are unscoped or scoped to its `forge_id`.
pub struct ForgeOptions<'a> {
    pub engine: OverrideEngine,
    pub resolver: &'a dyn ResourceResolver,
    pub overrides: &'a [OverrideRule],
}

impl<'a> ForgeOptions<'a> {
    pub fn new(resolver: &'a dyn ResourceResolver) -> Self {
        Self {
            engine: OverrideEngine::default(),
            resolver,
            overrides: &[],
        }
    }

    pub fn with_engine(mut self, engine: OverrideEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_overrides(mut self, overrides: &'a [OverrideRule]) -> Self {
        self.overrides = overrides;
        self
    }
}
