use crate::plugin::error::{AddonError, ExtensionError};
use crate::plugin::extension::{Capability, Extension, ExtensionCatalog, HostContext};
use crate::plugin::manifest::{PluginDefinition, PluginId};

/// A live plugin object rebuilt from source on every start.
#[derive(Debug)]
pub struct PluginRuntime {
    pub id: PluginId,
    pub definition: PluginDefinition,
    pub enabled: bool,
    extension: Option<Box<dyn Extension>>,
}

impl PluginRuntime {
    /// Evaluate plugin source and bind its `entry` against the catalog.
    pub fn evaluate(source: &str, catalog: &ExtensionCatalog) -> Result<Self, AddonError> {
        let definition = PluginDefinition::evaluate(source)?;
        let id = definition.plugin_id();

        let extension = match definition.entry.as_deref() {
            None => None,
            Some(entry) => {
                let created = catalog
                    .instantiate(entry, &definition.config)
                    .ok_or_else(|| AddonError::UnknownEntry(entry.to_string()))?;
                Some(created.map_err(|source| AddonError::Extension {
                    id: id.clone(),
                    source,
                })?)
            }
        };

        Ok(Self {
            id,
            enabled: definition.enabled,
            definition,
            extension,
        })
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.extension
            .as_ref()
            .is_some_and(|extension| extension.supports(capability))
    }

    pub fn display_name(&self) -> &str {
        &self.definition.name
    }

    /// Run one lifecycle hook. `Ok(false)` when the plugin lacks it.
    pub fn run_hook(
        &mut self,
        capability: Capability,
        host: &mut HostContext<'_>,
    ) -> Result<bool, ExtensionError> {
        let Some(extension) = self.extension.as_mut() else {
            return Ok(false);
        };

        if !extension.supports(capability) {
            return Ok(false);
        }

        match capability {
            Capability::Initialize => extension.initialize(host)?,
            Capability::Enable => extension.enable(host)?,
            Capability::Disable => extension.disable(host)?,
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::document::Document;
    use crate::store::MemoryStore;

    const PLAIN: &str = "id = \"plain\"\nname = \"Plain\"\ndescription = \"d\"\nversion = \"0.1.0\"";

    #[test]
    fn plugin_without_entry_has_no_capabilities() {
        let mut runtime = PluginRuntime::evaluate(PLAIN, &ExtensionCatalog::builtin()).unwrap();
        assert_eq!(runtime.display_name(), "Plain");
        assert!(!runtime.supports(Capability::Initialize));

        let mut store = MemoryStore::new();
        let mut document = Document::new();
        let id = runtime.id.clone();
        let mut host = HostContext {
            plugin_id: &id,
            store: &mut store,
            document: &mut document,
        };
        assert!(!runtime.run_hook(Capability::Enable, &mut host).unwrap());
    }

    #[test]
    fn unknown_entry_fails_evaluation() {
        let source = format!("{PLAIN}\nentry = \"wallpaper\"");
        let result = PluginRuntime::evaluate(&source, &ExtensionCatalog::builtin());
        assert!(matches!(result, Err(AddonError::UnknownEntry(entry)) if entry == "wallpaper"));
    }

    #[test]
    fn factory_errors_surface_as_extension_errors() {
        let source = format!("{PLAIN}\nentry = \"sticky-notes\"\n[config]\nmax_visible = -1");
        let result = PluginRuntime::evaluate(&source, &ExtensionCatalog::builtin());
        assert!(matches!(result, Err(AddonError::Extension { .. })));
    }

    #[test]
    fn enabled_flag_comes_from_definition() {
        let source = format!("{PLAIN}\nenabled = true\nentry = \"sticky-notes\"");
        let runtime = PluginRuntime::evaluate(&source, &ExtensionCatalog::builtin()).unwrap();
        assert!(runtime.enabled);
        assert!(runtime.supports(Capability::Disable));
    }
}
