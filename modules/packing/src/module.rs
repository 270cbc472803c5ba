use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use runtime::ConfigProvider;
use tracing::{debug, info};

use crate::config::PackingConfig;
use crate::contract::client::PackingApi;
use crate::contract::model::{UserId, UserProfile};
use crate::domain::identity::IdentityContext;
use crate::domain::service::Service;
use crate::domain::store::EventStore;
use crate::gateways::local::PackingLocalClient;
use crate::infra::seed;

/// Profile used when no user is selected.
pub fn guest_profile() -> UserProfile {
    UserProfile::new("guest", "Guest")
}

/// Startup options that come from the process rather than the config bag.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Seed file overriding `seed_file` from the module config.
    pub seed: Option<PathBuf>,
    /// Acting user; must exist in the seeded directory. `None` acts as guest.
    pub user: Option<UserId>,
}

/// Wired packing module: store, identity, domain service and local client.
pub struct PackingModule {
    config: PackingConfig,
    service: Arc<Service>,
    client: Arc<dyn PackingApi>,
}

impl std::fmt::Debug for PackingModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackingModule")
            .field("config", &self.config)
            .field("service", &self.service)
            .finish()
    }
}

impl PackingModule {
    pub const NAME: &'static str = "packing";

    /// Build the module from its config entry. A relative `seed_file` is
    /// resolved by the provider against the home directory.
    pub fn init(provider: &dyn ConfigProvider, options: InitOptions) -> anyhow::Result<Self> {
        info!("Initializing packing module");

        let cfg = PackingConfig::from_value(provider.get_module_config(Self::NAME))
            .context("Invalid configuration for module 'packing'")?;
        debug!(
            "Loaded packing config: max_title_length={}, max_item_name_length={}",
            cfg.max_title_length, cfg.max_item_name_length
        );

        let store = EventStore::new(cfg.store_config());
        let seed_path = options.seed.or_else(|| {
            cfg.seed_file
                .as_deref()
                .map(|file| provider.resolve_path(Path::new(file)))
        });
        if let Some(path) = seed_path {
            let snapshot = seed::load_snapshot(&path)?;
            store
                .reset(snapshot)
                .with_context(|| format!("Seed {} is inconsistent", path.display()))?;
            info!(path = %path.display(), "Store seeded");
        }

        let user = match options.user {
            Some(id) => store
                .user(&id)
                .with_context(|| format!("Unknown user '{id}'"))?,
            None => guest_profile(),
        };
        store.register_user(user.clone())?;

        let service = Arc::new(Service::new(
            Arc::new(store),
            Arc::new(IdentityContext::new(user)),
        ));
        let client: Arc<dyn PackingApi> = Arc::new(PackingLocalClient::new(service.clone()));
        info!("Packing module initialized");

        Ok(Self {
            config: cfg,
            service,
            client,
        })
    }

    pub fn config(&self) -> &PackingConfig {
        &self.config
    }

    pub fn service(&self) -> &Arc<Service> {
        &self.service
    }

    pub fn client(&self) -> Arc<dyn PackingApi> {
        self.client.clone()
    }
}
