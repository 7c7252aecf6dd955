use serde::{Deserialize, Serialize};

use crate::model::document::PageWidget;
use crate::plugin::error::ExtensionError;
use crate::plugin::extension::{Capability, Extension, HostContext};

pub const NOTES_KEY: &str = "stickyNotes";
const DEFAULT_MAX_VISIBLE: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default)]
    pub locked: bool,
}

/// Notes board pinned to the page. Only registration and show/hide are
/// handled here; editing happens on the page.
#[derive(Debug)]
pub struct StickyNotes {
    notes: Vec<Note>,
    max_visible: usize,
}

impl StickyNotes {
    pub const ENTRY: &'static str = "sticky-notes";

    pub fn create(config: &toml::Table) -> Result<Box<dyn Extension>, ExtensionError> {
        let max_visible = match config.get("max_visible") {
            None => DEFAULT_MAX_VISIBLE,
            Some(value) => value
                .as_integer()
                .and_then(|n| usize::try_from(n).ok())
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    ExtensionError::Config(format!(
                        "max_visible must be a positive integer, got {value}"
                    ))
                })?,
        };

        Ok(Box::new(Self {
            notes: Vec::new(),
            max_visible,
        }))
    }

    fn widget_lines(&self) -> Vec<String> {
        if self.notes.is_empty() {
            return vec!["(no notes yet)".to_string()];
        }

        let mut lines: Vec<String> = self
            .notes
            .iter()
            .take(self.max_visible)
            .map(|note| {
                let lock = if note.locked { "*" } else { " " };
                let first_line = note.text.lines().next().unwrap_or_default();
                format!("{lock} {first_line} @({}, {})", note.x, note.y)
            })
            .collect();

        let hidden = self.notes.len().saturating_sub(self.max_visible);
        if hidden > 0 {
            lines.push(format!("... {hidden} more"));
        }
        lines
    }
}

impl Extension for StickyNotes {
    fn supports(&self, capability: Capability) -> bool {
        matches!(
            capability,
            Capability::Initialize | Capability::Enable | Capability::Disable
        )
    }

    fn initialize(&mut self, host: &mut HostContext<'_>) -> Result<(), ExtensionError> {
        let raw = host.store.get(NOTES_KEY)?;
        self.notes = match raw {
            None => Vec::new(),
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                tracing::warn!("ignoring malformed {NOTES_KEY}: {err}");
                Vec::new()
            }),
        };
        tracing::debug!("sticky notes loaded {} notes", self.notes.len());
        Ok(())
    }

    fn enable(&mut self, host: &mut HostContext<'_>) -> Result<(), ExtensionError> {
        host.document.mount_widget(PageWidget {
            owner: host.plugin_id.clone(),
            title: "Sticky Notes".to_string(),
            lines: self.widget_lines(),
        });
        Ok(())
    }

    fn disable(&mut self, host: &mut HostContext<'_>) -> Result<(), ExtensionError> {
        host.document.unmount_widget(host.plugin_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::document::Document;
    use crate::plugin::manifest::PluginId;
    use crate::store::{KeyValueStore, MemoryStore};

    fn config(source: &str) -> toml::Table {
        source.parse().unwrap()
    }

    #[test]
    fn rejects_bad_max_visible() {
        assert!(matches!(
            StickyNotes::create(&config("max_visible = 0")),
            Err(ExtensionError::Config(_))
        ));
        assert!(matches!(
            StickyNotes::create(&config("max_visible = \"many\"")),
            Err(ExtensionError::Config(_))
        ));
    }

    #[test]
    fn enable_mounts_and_disable_unmounts() {
        let mut store = MemoryStore::new();
        store
            .set(
                NOTES_KEY,
                r#"[{"id":"1","text":"buy milk\nand eggs","x":10,"y":20,"locked":true},
                    {"id":"2","text":"call back","x":0,"y":0},
                    {"id":"3","text":"third"}]"#,
            )
            .unwrap();
        let mut document = Document::new();
        let id = PluginId::new("notes");
        let mut notes = StickyNotes::create(&config("max_visible = 2")).unwrap();

        let mut host = HostContext {
            plugin_id: &id,
            store: &mut store,
            document: &mut document,
        };
        notes.initialize(&mut host).unwrap();
        notes.enable(&mut host).unwrap();

        let widget = &host.document.widgets()[0];
        assert_eq!(widget.owner, id);
        assert_eq!(
            widget.lines,
            vec![
                "* buy milk @(10, 20)".to_string(),
                "  call back @(0, 0)".to_string(),
                "... 1 more".to_string(),
            ]
        );

        notes.disable(&mut host).unwrap();
        assert!(host.document.widgets().is_empty());
    }

    #[test]
    fn malformed_notes_load_as_empty() {
        let mut store = MemoryStore::new();
        store.set(NOTES_KEY, "not json").unwrap();
        let mut document = Document::new();
        let id = PluginId::new("notes");
        let mut notes = StickyNotes::create(&toml::Table::new()).unwrap();

        let mut host = HostContext {
            plugin_id: &id,
            store: &mut store,
            document: &mut document,
        };
        notes.initialize(&mut host).unwrap();
        notes.enable(&mut host).unwrap();

        assert_eq!(
            host.document.widgets()[0].lines,
            vec!["(no notes yet)".to_string()]
        );
    }
}
