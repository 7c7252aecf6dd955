use std::collections::BTreeMap;
use std::collections::HashSet;

use crate::model::document::{AddonItem, AddonSection, Document};
use crate::plugin::error::{AddonError, ExtensionError};
use crate::plugin::extension::{Capability, ExtensionCatalog, HostContext};
use crate::plugin::manifest::PluginId;
use crate::plugin::record::{self, PluginRecord};
use crate::plugin::runtime::PluginRuntime;
use crate::store::KeyValueStore;

#[derive(Debug)]
struct InstalledAddon {
    runtime: PluginRuntime,
    code: String,
    style_code: Option<String>,
}

impl InstalledAddon {
    fn record(&self) -> PluginRecord {
        PluginRecord {
            id: self.runtime.id.to_string(),
            code: self.code.clone(),
            style_code: self.style_code.clone(),
        }
    }
}

/// Owns the installed plugins, their persisted records and the page surface
/// they draw on.
#[derive(Debug)]
pub struct AddonManager {
    /// Insertion order is display order.
    addons: Vec<InstalledAddon>,
    installed: HashSet<PluginId>,
    states: BTreeMap<String, bool>,
    store: Box<dyn KeyValueStore>,
    document: Document,
    catalog: ExtensionCatalog,
    remember_enabled: bool,
}

impl AddonManager {
    pub fn new(store: Box<dyn KeyValueStore>, catalog: ExtensionCatalog) -> Self {
        Self {
            addons: Vec::new(),
            installed: HashSet::new(),
            states: BTreeMap::new(),
            store,
            document: Document::new(),
            catalog,
            remember_enabled: true,
        }
    }

    pub fn with_remember_enabled(mut self, remember_enabled: bool) -> Self {
        self.remember_enabled = remember_enabled;
        self
    }

    /// Rebuild the registry from the persisted records, then render.
    ///
    /// Records that fail to restore are logged and pruned from the store so
    /// the persisted list matches the registry afterwards.
    pub fn initialize(&mut self) {
        let records = record::load_records(self.store.as_ref());
        if self.remember_enabled {
            self.states = record::load_states(self.store.as_ref());
        }

        let mut restored = 0;
        for persisted in &records {
            match self.register(&persisted.code, persisted.style_code.as_deref(), false) {
                Ok(id) => {
                    if id.as_str() != persisted.id {
                        tracing::warn!(
                            "plugin record {} evaluated to id {id}",
                            persisted.id
                        );
                    }
                    restored += 1;
                }
                Err(err) => tracing::warn!("failed to restore plugin {}: {err}", persisted.id),
            }
        }

        let current = self.records();
        if current != records {
            tracing::info!(
                "pruning {} unrestorable plugin records",
                records.len() - restored
            );
            if let Err(err) = record::save_records(self.store.as_mut(), &current) {
                tracing::warn!("failed to rewrite plugin records: {err}");
            }
        }

        let installed = &self.installed;
        let stale = self
            .states
            .keys()
            .any(|id| !installed.contains(&PluginId::new(id.clone())));
        if stale {
            self.states
                .retain(|id, _| installed.contains(&PluginId::new(id.clone())));
            self.persist_states();
        }

        tracing::info!("restored {restored} of {} plugins", records.len());
        self.render_settings();
    }

    /// Install a plugin from source. Failures are logged and reported as
    /// `false`; nothing is left half-installed.
    pub fn install(&mut self, code: &str, style_code: Option<&str>) -> bool {
        match self.register(code, style_code, true) {
            Ok(id) => {
                tracing::info!("installed plugin {id}");
                self.render_settings();
                true
            }
            Err(err) => {
                tracing::warn!("failed to install plugin: {err}");
                false
            }
        }
    }

    pub fn uninstall(&mut self, id: &PluginId) -> bool {
        match self.try_uninstall(id) {
            Ok(()) => {
                tracing::info!("uninstalled plugin {id}");
                true
            }
            Err(err @ AddonError::NotInstalled(_)) => {
                tracing::debug!("{err}");
                false
            }
            Err(err) => {
                tracing::warn!("failed to uninstall plugin {id}: {err}");
                false
            }
        }
    }

    /// Run the plugin's `enable` hook. `false` when the plugin is absent,
    /// has no such hook, or the hook failed.
    pub fn enable_addon(&mut self, id: &PluginId) -> bool {
        self.set_enabled(id, true)
    }

    pub fn disable_addon(&mut self, id: &PluginId) -> bool {
        self.set_enabled(id, false)
    }

    pub fn render_settings(&mut self) {
        let section = self.section();
        self.document.replace_addon_section(section);
    }

    pub fn get(&self, id: &PluginId) -> Option<&PluginRuntime> {
        self.addons
            .iter()
            .find(|addon| &addon.runtime.id == id)
            .map(|addon| &addon.runtime)
    }

    pub fn is_installed(&self, id: &PluginId) -> bool {
        self.installed.contains(id)
    }

    pub fn plugins(&self) -> impl Iterator<Item = &PluginRuntime> {
        self.addons.iter().map(|addon| &addon.runtime)
    }

    pub fn len(&self) -> usize {
        self.addons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addons.is_empty()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    #[cfg(test)]
    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn catalog(&self) -> &ExtensionCatalog {
        &self.catalog
    }

    fn register(
        &mut self,
        code: &str,
        style_code: Option<&str>,
        persist: bool,
    ) -> Result<PluginId, AddonError> {
        let runtime = PluginRuntime::evaluate(code, &self.catalog)?;
        let id = runtime.id.clone();
        if self.installed.contains(&id) {
            return Err(AddonError::Duplicate(id));
        }

        let addon = InstalledAddon {
            runtime,
            code: code.to_string(),
            style_code: style_code
                .filter(|css| !css.trim().is_empty())
                .map(str::to_string),
        };

        let previous = if persist {
            let previous = self.records();
            let mut next = previous.clone();
            next.push(addon.record());
            record::save_records(self.store.as_mut(), &next)?;
            Some(previous)
        } else {
            None
        };

        if let Some(css) = addon.style_code.as_deref() {
            self.document.inject_style(&id, css);
        }
        self.addons.push(addon);
        self.installed.insert(id.clone());

        if let Err(source) = self.run_hook(&id, Capability::Initialize) {
            self.roll_back_install(&id, previous);
            return Err(AddonError::Extension { id, source });
        }

        self.apply_enabled_state(&id);
        Ok(id)
    }

    fn roll_back_install(&mut self, id: &PluginId, previous: Option<Vec<PluginRecord>>) {
        self.addons.retain(|addon| &addon.runtime.id != id);
        self.installed.remove(id);
        self.document.remove_style(id);
        self.document.unmount_widget(id);

        if let Some(previous) = previous {
            if let Err(err) = record::save_records(self.store.as_mut(), &previous) {
                tracing::warn!("failed to roll back plugin records for {id}: {err}");
            }
        }
    }

    /// Saved state wins over the definition's `enabled`. Plugins that start
    /// enabled get their `enable` hook so the page matches the flag.
    fn apply_enabled_state(&mut self, id: &PluginId) {
        let saved = self.states.get(id.as_str()).copied();
        let Some(addon) = self.addon_mut(id) else {
            return;
        };

        let wanted = saved.unwrap_or(addon.runtime.enabled);
        addon.runtime.enabled = wanted;
        if !wanted || !addon.runtime.supports(Capability::Enable) {
            return;
        }

        if let Err(err) = self.run_hook(id, Capability::Enable) {
            tracing::warn!("plugin {id} failed to enable on start: {err}");
            if let Some(addon) = self.addon_mut(id) {
                addon.runtime.enabled = false;
            }
        }
    }

    fn try_uninstall(&mut self, id: &PluginId) -> Result<(), AddonError> {
        if !self.installed.contains(id) {
            return Err(AddonError::NotInstalled(id.clone()));
        }

        let remaining: Vec<PluginRecord> = self
            .addons
            .iter()
            .filter(|addon| &addon.runtime.id != id)
            .map(InstalledAddon::record)
            .collect();
        record::save_records(self.store.as_mut(), &remaining)?;

        self.document.remove_style(id);
        if let Err(err) = self.run_hook(id, Capability::Disable) {
            tracing::warn!("plugin {id} failed to disable during uninstall: {err}");
        }
        self.document.unmount_widget(id);

        self.addons.retain(|addon| &addon.runtime.id != id);
        self.installed.remove(id);

        if self.states.remove(id.as_str()).is_some() {
            self.persist_states();
        }

        self.render_settings();
        Ok(())
    }

    fn set_enabled(&mut self, id: &PluginId, enabled: bool) -> bool {
        let capability = if enabled {
            Capability::Enable
        } else {
            Capability::Disable
        };

        match self.run_hook(id, capability) {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!("plugin {id} has no {capability:?} hook");
                return false;
            }
            Err(err) => {
                tracing::warn!("plugin {id} failed {capability:?}: {err}");
                return false;
            }
        }

        if let Some(addon) = self.addon_mut(id) {
            addon.runtime.enabled = enabled;
        }

        if self.remember_enabled {
            self.states.insert(id.to_string(), enabled);
            self.persist_states();
        }

        self.render_settings();
        true
    }

    fn run_hook(&mut self, id: &PluginId, capability: Capability) -> Result<bool, ExtensionError> {
        let Some(addon) = self.addons.iter_mut().find(|addon| &addon.runtime.id == id) else {
            return Ok(false);
        };

        let mut host = HostContext {
            plugin_id: id,
            store: self.store.as_mut(),
            document: &mut self.document,
        };
        addon.runtime.run_hook(capability, &mut host)
    }

    fn persist_states(&mut self) {
        if let Err(err) = record::save_states(self.store.as_mut(), &self.states) {
            tracing::warn!("failed to save addon states: {err}");
        }
    }

    fn addon_mut(&mut self, id: &PluginId) -> Option<&mut InstalledAddon> {
        self.addons.iter_mut().find(|addon| &addon.runtime.id == id)
    }

    fn records(&self) -> Vec<PluginRecord> {
        self.addons.iter().map(InstalledAddon::record).collect()
    }

    fn section(&self) -> AddonSection {
        AddonSection {
            items: self
                .addons
                .iter()
                .map(|addon| {
                    let definition = &addon.runtime.definition;
                    AddonItem {
                        id: addon.runtime.id.clone(),
                        name: definition.name.clone(),
                        version: definition.version.clone(),
                        description: definition.description.clone(),
                        author: definition.author.clone(),
                        enabled: addon.runtime.enabled,
                        has_style: self.document.style(&addon.runtime.id).is_some(),
                    }
                })
                .collect(),
        }
    }
}
