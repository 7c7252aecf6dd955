use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::store::{KeyValueStore, StoreError};

pub const INSTALLED_PLUGINS_KEY: &str = "installedPlugins";
pub const ADDON_STATES_KEY: &str = "addonStates";

/// Persisted form of an installed plugin: its source, not its live object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginRecord {
    pub id: String,
    pub code: String,
    #[serde(default)]
    pub style_code: Option<String>,
}

/// Read the installed list. Absent, unreadable or malformed state reads as
/// "nothing installed".
pub fn load_records(store: &dyn KeyValueStore) -> Vec<PluginRecord> {
    let raw = match store.get(INSTALLED_PLUGINS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            tracing::warn!("failed to read {INSTALLED_PLUGINS_KEY}: {err}");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Option<Vec<PluginRecord>>>(&raw) {
        Ok(records) => records.unwrap_or_default(),
        Err(err) => {
            tracing::warn!("ignoring malformed {INSTALLED_PLUGINS_KEY}: {err}");
            Vec::new()
        }
    }
}

/// Overwrite the installed list.
pub fn save_records(
    store: &mut dyn KeyValueStore,
    records: &[PluginRecord],
) -> Result<(), StoreError> {
    let encoded = serde_json::to_string(records)?;
    store.set(INSTALLED_PLUGINS_KEY, &encoded)
}

pub fn load_states(store: &dyn KeyValueStore) -> BTreeMap<String, bool> {
    let raw = match store.get(ADDON_STATES_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return BTreeMap::new(),
        Err(err) => {
            tracing::warn!("failed to read {ADDON_STATES_KEY}: {err}");
            return BTreeMap::new();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|err| {
        tracing::warn!("ignoring malformed {ADDON_STATES_KEY}: {err}");
        BTreeMap::new()
    })
}

pub fn save_states(
    store: &mut dyn KeyValueStore,
    states: &BTreeMap<String, bool>,
) -> Result<(), StoreError> {
    if states.is_empty() {
        return store.remove(ADDON_STATES_KEY);
    }

    let encoded = serde_json::to_string(states)?;
    store.set(ADDON_STATES_KEY, &encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn records_use_page_field_names() {
        let mut store = MemoryStore::new();
        let records = vec![
            PluginRecord {
                id: "a".to_string(),
                code: "id = \"a\"".to_string(),
                style_code: Some(".a {}".to_string()),
            },
            PluginRecord {
                id: "b".to_string(),
                code: "id = \"b\"".to_string(),
                style_code: None,
            },
        ];

        save_records(&mut store, &records).unwrap();

        let raw = store.get(INSTALLED_PLUGINS_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["styleCode"], ".a {}");
        assert!(value[1]["styleCode"].is_null());
        assert_eq!(load_records(&store), records);
    }

    #[test]
    fn missing_style_code_and_null_list_are_tolerated() {
        let mut store = MemoryStore::new();
        store
            .set(INSTALLED_PLUGINS_KEY, r#"[{"id":"a","code":"x"}]"#)
            .unwrap();
        assert_eq!(load_records(&store)[0].style_code, None);

        store.set(INSTALLED_PLUGINS_KEY, "null").unwrap();
        assert!(load_records(&store).is_empty());
    }

    #[test]
    fn malformed_list_reads_as_empty() {
        let mut store = MemoryStore::new();
        assert!(load_records(&store).is_empty());

        store.set(INSTALLED_PLUGINS_KEY, "{oops").unwrap();
        assert!(load_records(&store).is_empty());

        store
            .set(INSTALLED_PLUGINS_KEY, r#"{"id":"a"}"#)
            .unwrap();
        assert!(load_records(&store).is_empty());
    }

    #[test]
    fn empty_states_clear_the_key() {
        let mut store = MemoryStore::new();
        let mut states = BTreeMap::new();
        states.insert("a".to_string(), true);

        save_states(&mut store, &states).unwrap();
        assert_eq!(load_states(&store).get("a"), Some(&true));

        save_states(&mut store, &BTreeMap::new()).unwrap();
        assert_eq!(store.get(ADDON_STATES_KEY).unwrap(), None);
    }
}
