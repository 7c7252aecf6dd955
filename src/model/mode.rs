/// Settings panel interaction modes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    /// Addon list navigation.
    #[default]
    Normal,
    /// Editing the plugin code field.
    EditCode,
    /// Editing the optional style field.
    EditStyle,
    /// Waiting for y/n before uninstalling.
    ConfirmUninstall,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Normal => "ADDONS",
            Mode::EditCode => "CODE",
            Mode::EditStyle => "STYLE",
            Mode::ConfirmUninstall => "CONFIRM",
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Mode::EditCode | Mode::EditStyle)
    }
}
