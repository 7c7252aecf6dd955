use thiserror::Error;

use crate::plugin::manifest::PluginId;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AddonError {
    #[error("plugin source did not evaluate: {0}")]
    Evaluate(String),

    #[error("plugin definition is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("plugin field `{field}` is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("plugin already installed: {0}")]
    Duplicate(PluginId),

    #[error("plugin not installed: {0}")]
    NotInstalled(PluginId),

    #[error("unknown plugin entry: {0}")]
    UnknownEntry(String),

    #[error("plugin {id}: {source}")]
    Extension {
        id: PluginId,
        #[source]
        source: ExtensionError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("invalid extension config: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
