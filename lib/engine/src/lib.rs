pub mod backup;
pub mod codec;
pub mod coordinator;
pub mod draft;
pub mod persistence;
pub mod remote;
mod seed;
pub mod store;
pub mod versioning;

pub use coordinator::Coordinator;

use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: store::Config,
    /// Quiet period before local changes are pushed to the remote store.
    #[serde(default = "Config::default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: store::Config::default(),
            debounce_ms: Self::default_debounce_ms(),
        }
    }
}

impl Config {
    fn default_debounce_ms() -> u64 {
        2000
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Loads the persisted state and, when an endpoint is configured, starts
    /// the initial fetch. Must be called from within a tokio runtime.
    pub fn build(&self) -> Coordinator {
        tracing::debug!("building coordinator");
        let storage = persistence::LocalStorage::new(self.store.build());
        let remote = Arc::new(remote::http::HttpRemote::default());
        Coordinator::load(
            storage,
            remote,
            coordinator::Options {
                debounce: self.debounce(),
            },
        )
    }
}
