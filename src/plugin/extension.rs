use std::collections::BTreeMap;
use std::fmt;

use crate::model::document::Document;
use crate::plugin::error::ExtensionError;
use crate::plugin::manifest::PluginId;
use crate::plugin::sticky_notes::StickyNotes;
use crate::store::KeyValueStore;

/// Lifecycle hooks a plugin may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Initialize,
    Enable,
    Disable,
}

/// The host surface handed to extension hooks.
pub struct HostContext<'a> {
    pub plugin_id: &'a PluginId,
    pub store: &'a mut dyn KeyValueStore,
    pub document: &'a mut Document,
}

/// Compiled-in plugin behaviour. Hooks a plugin does not support are never
/// called; `supports` is the source of truth.
pub trait Extension: fmt::Debug {
    fn supports(&self, capability: Capability) -> bool;

    fn initialize(&mut self, _host: &mut HostContext<'_>) -> Result<(), ExtensionError> {
        Ok(())
    }

    fn enable(&mut self, _host: &mut HostContext<'_>) -> Result<(), ExtensionError> {
        Ok(())
    }

    fn disable(&mut self, _host: &mut HostContext<'_>) -> Result<(), ExtensionError> {
        Ok(())
    }
}

pub type ExtensionFactory = fn(&toml::Table) -> Result<Box<dyn Extension>, ExtensionError>;

#[derive(Debug, Clone, Default)]
pub struct ExtensionCatalog {
    factories: BTreeMap<&'static str, ExtensionFactory>,
}

impl ExtensionCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalog with every extension shipped in this binary.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        catalog.register(StickyNotes::ENTRY, StickyNotes::create);
        catalog
    }

    pub fn register(&mut self, entry: &'static str, factory: ExtensionFactory) {
        if self.factories.insert(entry, factory).is_some() {
            tracing::warn!("extension entry registered twice: {entry}");
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    /// `None` when no extension is registered under `entry`.
    pub fn instantiate(
        &self,
        entry: &str,
        config: &toml::Table,
    ) -> Option<Result<Box<dyn Extension>, ExtensionError>> {
        self.factories.get(entry).map(|factory| factory(config))
    }
}
