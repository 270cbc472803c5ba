use serde::{Deserialize, Serialize};

use crate::contract::model::CategoryInput;
use crate::domain::store::StoreConfig;

/// Configuration for the packing module (`modules.packing` in the app config).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackingConfig {
    /// Categories given to events created without an explicit list.
    #[serde(default = "default_categories")]
    pub default_categories: Vec<CategoryConfig>,
    #[serde(default = "default_max_length")]
    pub max_title_length: usize,
    #[serde(default = "default_max_length")]
    pub max_item_name_length: usize,
    /// YAML or JSON snapshot loaded at startup, relative to `app.home_dir`.
    #[serde(default)]
    pub seed_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryConfig {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            default_categories: default_categories(),
            max_title_length: default_max_length(),
            max_item_name_length: default_max_length(),
            seed_file: None,
        }
    }
}

fn default_categories() -> Vec<CategoryConfig> {
    [("Tech", "#0EA5E9"), ("Food", "#10B981")]
        .into_iter()
        .map(|(name, color)| CategoryConfig {
            name: name.to_string(),
            color: Some(color.to_string()),
        })
        .collect()
}

fn default_max_length() -> usize {
    100
}

impl PackingConfig {
    /// Parse the module entry of the config bag; a missing entry means defaults.
    pub fn from_value(value: Option<&serde_json::Value>) -> anyhow::Result<Self> {
        match value {
            Some(v) => Ok(serde_json::from_value(v.clone())?),
            None => Ok(Self::default()),
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            default_categories: self
                .default_categories
                .iter()
                .map(|c| {
                    let input = CategoryInput::new(c.name.clone());
                    match &c.color {
                        Some(color) => input.with_color(color.clone()),
                        None => input,
                    }
                })
                .collect(),
            max_title_length: self.max_title_length,
            max_item_name_length: self.max_item_name_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_entry_uses_defaults() {
        let cfg = PackingConfig::from_value(None).unwrap();
        assert_eq!(cfg, PackingConfig::default());
        let store = cfg.store_config();
        assert_eq!(store.default_categories.len(), 2);
        assert_eq!(store.max_title_length, 100);
    }

    #[test]
    fn partial_entry_keeps_other_defaults() {
        let value = json!({
            "max_title_length": 40,
            "default_categories": [{ "name": "Gear" }]
        });
        let cfg = PackingConfig::from_value(Some(&value)).unwrap();
        assert_eq!(cfg.max_title_length, 40);
        assert_eq!(cfg.max_item_name_length, 100);
        assert_eq!(cfg.store_config().default_categories[0].color, None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let value = json!({ "page_size": 10 });
        assert!(PackingConfig::from_value(Some(&value)).is_err());
    }
}
