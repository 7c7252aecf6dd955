use crate::plugin::manifest::PluginId;

/// A style block injected into the page, tagged by the owning plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleBlock {
    pub plugin_id: PluginId,
    pub css: String,
}

/// A panel a plugin mounts on the page (e.g. the sticky notes board).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWidget {
    pub owner: PluginId,
    pub title: String,
    pub lines: Vec<String>,
}

/// One row of the addon list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonItem {
    pub id: PluginId,
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: Option<String>,
    pub enabled: bool,
    pub has_style: bool,
}

/// The addon section of the settings container. The install form itself is
/// owned by the UI; the section only describes what to draw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddonSection {
    pub items: Vec<AddonItem>,
}

impl AddonSection {
    pub const EMPTY_MESSAGE: &'static str = "No plugins installed";

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// In-process model of the page: style sheet, settings container and
/// plugin-mounted widgets.
#[derive(Debug, Default)]
pub struct Document {
    styles: Vec<StyleBlock>,
    addon_section: Option<AddonSection>,
    widgets: Vec<PageWidget>,
    render_count: u64,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject a style block. A block already tagged with `plugin_id` is replaced.
    pub fn inject_style(&mut self, plugin_id: &PluginId, css: &str) {
        self.remove_style(plugin_id);
        self.styles.push(StyleBlock {
            plugin_id: plugin_id.clone(),
            css: css.to_string(),
        });
    }

    pub fn remove_style(&mut self, plugin_id: &PluginId) -> bool {
        let before = self.styles.len();
        self.styles.retain(|block| &block.plugin_id != plugin_id);
        self.styles.len() != before
    }

    pub fn style(&self, plugin_id: &PluginId) -> Option<&str> {
        self.styles
            .iter()
            .find(|block| &block.plugin_id == plugin_id)
            .map(|block| block.css.as_str())
    }

    pub fn styles(&self) -> &[StyleBlock] {
        &self.styles
    }

    /// Replace any prior addon section in the settings container.
    pub fn replace_addon_section(&mut self, section: AddonSection) {
        self.addon_section = Some(section);
        self.render_count += 1;
    }

    pub fn addon_section(&self) -> Option<&AddonSection> {
        self.addon_section.as_ref()
    }

    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    pub fn mount_widget(&mut self, widget: PageWidget) {
        self.unmount_widget(&widget.owner);
        self.widgets.push(widget);
    }

    pub fn unmount_widget(&mut self, owner: &PluginId) -> bool {
        let before = self.widgets.len();
        self.widgets.retain(|widget| &widget.owner != owner);
        self.widgets.len() != before
    }

    pub fn widgets(&self) -> &[PageWidget] {
        &self.widgets
    }
}
