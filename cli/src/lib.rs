pub mod recent_cmd;
mod render;
pub mod search_cmd;
pub mod session_cmd;

use anyhow::Result;
use marquee_search::ClientOptions;
use marquee_search::HttpSearchClient;
use marquee_search::OverlayController;
use marquee_search::OverlayEvent;
use marquee_search::RecentSearchStore;
use marquee_search::ScopedCache;
use marquee_search::SearchBackend;
use marquee_search::SearchConfig;
use marquee_search::cache::DEFAULT_CAPACITY;
use marquee_search::cache::DEFAULT_TTL;
use marquee_search::config::CONFIG_FILENAME;
use marquee_search::config::marquee_home;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` wins over
/// the `warn` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Resolved configuration shared by every subcommand.
#[derive(Debug, Clone)]
pub struct CliContext {
    pub config: SearchConfig,
    pub home: PathBuf,
}

impl CliContext {
    pub fn load(endpoint: Option<String>) -> Result<Self> {
        let home = marquee_home()?;
        let mut config = SearchConfig::load(&home.join(CONFIG_FILENAME))?;
        if let Some(endpoint) = endpoint {
            config.endpoint = endpoint;
        }
        debug!(home = %home.display(), endpoint = %config.endpoint, "loaded search config");
        Ok(Self { config, home })
    }

    pub fn recent_store(&self) -> RecentSearchStore {
        RecentSearchStore::new(self.home.clone(), self.config.recent_capacity)
    }

    pub fn backend(&self) -> Result<Arc<dyn SearchBackend>> {
        let client = HttpSearchClient::new(ClientOptions {
            endpoint: self.config.endpoint.clone(),
            api_token: self.config.api_token.clone(),
            timeout: self.config.request_timeout(),
        })?;
        Ok(Arc::new(client))
    }

    /// The process-wide cache, unless the config asks for different bounds.
    pub fn cache(&self) -> Arc<ScopedCache> {
        let ttl = self.config.cache_ttl();
        if self.config.cache_capacity == DEFAULT_CAPACITY && ttl == DEFAULT_TTL {
            ScopedCache::global()
        } else {
            Arc::new(ScopedCache::new(self.config.cache_capacity, ttl))
        }
    }
}

/// Feeds overlay events until no keystroke or request is outstanding.
pub async fn drive_until_settled(
    overlay: &mut OverlayController,
    rx: &mut UnboundedReceiver<OverlayEvent>,
) {
    while !overlay.is_settled() {
        let Some(event) = rx.recv().await else {
            break;
        };
        overlay.handle_event(event);
    }
}
