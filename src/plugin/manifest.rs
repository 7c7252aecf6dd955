use serde::Deserialize;
use std::fmt;

use crate::plugin::error::AddonError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PluginId(pub String);

impl PluginId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fields every plugin definition must carry.
pub const REQUIRED_FIELDS: [&str; 4] = ["id", "name", "description", "version"];

/// Metadata half of a plugin object. Capabilities come from the extension
/// named by `entry`.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub entry: Option<String>,
    #[serde(default)]
    pub config: toml::Table,
}

impl PluginDefinition {
    /// Evaluate plugin source into a definition.
    ///
    /// Required fields are checked on the raw table first so a missing field
    /// is reported as such rather than as a generic decode error.
    pub fn evaluate(source: &str) -> Result<Self, AddonError> {
        let table: toml::Table = source
            .parse()
            .map_err(|err: toml::de::Error| AddonError::Evaluate(err.message().to_string()))?;

        if table.is_empty() {
            return Err(AddonError::Evaluate(
                "source produced no plugin definition".to_string(),
            ));
        }

        for field in REQUIRED_FIELDS {
            match table.get(field) {
                None => return Err(AddonError::MissingField(field)),
                Some(toml::Value::String(_)) => {}
                Some(other) => {
                    return Err(AddonError::InvalidField {
                        field,
                        reason: format!("expected a string, found {}", other.type_str()),
                    });
                }
            }
        }

        let definition: PluginDefinition = toml::Value::Table(table)
            .try_into()
            .map_err(|err: toml::de::Error| AddonError::Evaluate(err.message().to_string()))?;

        if definition.id.trim().is_empty() {
            return Err(AddonError::InvalidField {
                field: "id",
                reason: "must not be empty".to_string(),
            });
        }

        Ok(definition)
    }

    pub fn plugin_id(&self) -> PluginId {
        PluginId::new(self.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_full_definition() {
        let source = r#"
            id = "sticky-notes"
            name = "Sticky Notes"
            description = "Notes on the page"
            version = "1.0.0"
            author = "SleekTab"
            enabled = true
            entry = "sticky-notes"

            [config]
            max_visible = 4
        "#;

        let definition = PluginDefinition::evaluate(source).unwrap();
        assert_eq!(definition.plugin_id(), PluginId::new("sticky-notes"));
        assert_eq!(definition.author.as_deref(), Some("SleekTab"));
        assert!(definition.enabled);
        assert_eq!(definition.entry.as_deref(), Some("sticky-notes"));
        assert_eq!(
            definition.config.get("max_visible").and_then(toml::Value::as_integer),
            Some(4)
        );
    }

    #[test]
    fn optional_fields_default() {
        let definition = PluginDefinition::evaluate(
            "id = \"a\"\nname = \"A\"\ndescription = \"d\"\nversion = \"1.0.0\"",
        )
        .unwrap();

        assert!(!definition.enabled);
        assert!(definition.author.is_none());
        assert!(definition.entry.is_none());
        assert!(definition.config.is_empty());
    }

    #[test]
    fn each_required_field_is_enforced() {
        let fields = [
            ("id", "\"a\""),
            ("name", "\"A\""),
            ("description", "\"d\""),
            ("version", "\"1.0.0\""),
        ];

        for (skipped, _) in fields {
            let source: String = fields
                .iter()
                .filter(|(name, _)| *name != skipped)
                .map(|(name, value)| format!("{name} = {value}\n"))
                .collect();

            match PluginDefinition::evaluate(&source) {
                Err(AddonError::MissingField(field)) => assert_eq!(field, skipped),
                other => panic!("expected missing {skipped}, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_non_string_required_field() {
        let result = PluginDefinition::evaluate(
            "id = \"a\"\nname = \"A\"\ndescription = \"d\"\nversion = 1",
        );
        assert!(matches!(
            result,
            Err(AddonError::InvalidField { field: "version", .. })
        ));
    }

    #[test]
    fn rejects_blank_id() {
        let result = PluginDefinition::evaluate(
            "id = \"  \"\nname = \"A\"\ndescription = \"d\"\nversion = \"1\"",
        );
        assert!(matches!(result, Err(AddonError::InvalidField { field: "id", .. })));
    }

    #[test]
    fn syntax_errors_and_empty_source_fail_evaluation() {
        assert!(matches!(
            PluginDefinition::evaluate("id = "),
            Err(AddonError::Evaluate(_))
        ));
        assert!(matches!(
            PluginDefinition::evaluate("# nothing here"),
            Err(AddonError::Evaluate(_))
        ));
    }
}
