use std::path::Path;
use std::sync::Arc;

use supabase_adapter::SupabaseClient;
use tracing::{info, warn};

use crate::backend::{Backend, BackendError, FallbackBackend, HostedBackend};
use crate::config::BackendConfig;
use crate::member::AuthUser;
use local_store_adapter::LocalStore;

/// Name of the fallback store file under the data directory.
const FALLBACK_STORE_FILE: &str = "fallback_store.json";

/// The member portal: one backend handle shared by every page controller,
/// resolved once at startup from the configuration capability check.
pub struct Portal {
    backend: Arc<dyn Backend>,
}

impl Portal {
    /// Build the portal from configuration. A configured backend gets the
    /// hosted client; otherwise the site silently runs in demo mode against
    /// the local fallback store, with the original fake latency.
    ///
    /// # Errors
    /// Returns `BackendError` if the hosted client cannot be constructed.
    pub fn new(config: &BackendConfig, data_dir: &Path) -> Result<Self, BackendError> {
        if config.is_configured() {
            info!("hosted backend configured at {}", config.url);
            let client = SupabaseClient::new(&config.url, &config.anon_key)?;
            Ok(Self {
                backend: Arc::new(HostedBackend::new(client)),
            })
        } else {
            info!("no hosted backend configured; using the local fallback store");
            let store = LocalStore::open(data_dir.join(FALLBACK_STORE_FILE));
            Ok(Self {
                backend: Arc::new(FallbackBackend::new(store).with_simulated_latency()),
            })
        }
    }

    /// Build the portal around an explicit backend (tests, embedding).
    pub fn with_backend(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn is_hosted(&self) -> bool {
        self.backend.is_hosted()
    }

    /// Currently signed-in member, if any. Lookup failures are logged and
    /// treated as "nobody signed in".
    pub async fn current_user(&self) -> Option<AuthUser> {
        match self.backend.current_user().await {
            Ok(user) => user,
            Err(e) => {
                warn!("current-user lookup failed: {e}");
                None
            }
        }
    }
}
