//! Process-level plumbing shared by PackPal binaries: layered configuration,
//! home directory resolution and logging setup.

pub mod config;
pub mod logging;
pub mod paths;

use std::path::{Path, PathBuf};

pub use config::{default_logging_config, AppConfig, AppSection, CliArgs, LoggingConfig, Section};

/// Read-only access to per-module configuration values.
pub trait ConfigProvider: Send + Sync {
    /// Raw configuration for `module_name`, if the config bag has an entry for it.
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value>;

    /// Resolve a path from module config against the process home directory.
    fn resolve_path(&self, path: &Path) -> PathBuf;
}

/// [`ConfigProvider`] backed by a loaded [`AppConfig`].
#[derive(Debug, Clone)]
pub struct AppConfigProvider {
    config: AppConfig,
}

impl AppConfigProvider {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl ConfigProvider for AppConfigProvider {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
        self.config.modules.get(module_name)
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        self.config.resolve_path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_returns_module_entry() {
        let mut config = AppConfig::default();
        config
            .modules
            .insert("packing".to_string(), serde_json::json!({"max_title_length": 42}));

        let provider = AppConfigProvider::new(config);
        let value = provider.get_module_config("packing").expect("module entry");
        assert_eq!(value["max_title_length"], 42);
        assert!(provider.get_module_config("missing").is_none());
    }

    #[test]
    fn provider_resolves_relative_paths_against_home() {
        let mut config = AppConfig::default();
        config.app.home_dir = "/srv/packpal".to_string();

        let provider = AppConfigProvider::new(config);
        assert_eq!(
            provider.resolve_path(Path::new("seed.yaml")),
            PathBuf::from("/srv/packpal/seed.yaml")
        );
        assert_eq!(
            provider.resolve_path(Path::new("/etc/seed.yaml")),
            PathBuf::from("/etc/seed.yaml")
        );
    }
}
