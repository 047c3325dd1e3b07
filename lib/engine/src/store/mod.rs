//! Durable key/value storage. Values are whole strings, every write replaces
//! the previous value of the key.

pub mod file;
pub mod memory;

use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unable to read {key:?}: {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to write {key:?}: {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

pub trait Store: std::fmt::Debug + Send + Sync {
    /// Returns `None` when nothing was ever written under `key`.
    fn load(&self, key: &str) -> Result<Option<String>, Error>;
    fn save(&self, key: &str, value: &str) -> Result<(), Error>;
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Config {
    File(file::Config),
    Memory,
}

impl Default for Config {
    fn default() -> Self {
        Self::File(file::Config::default())
    }
}

impl Config {
    pub fn build(&self) -> Arc<dyn Store> {
        tracing::debug!("building local store");
        match self {
            Self::File(item) => Arc::new(item.build()),
            Self::Memory => Arc::new(memory::MemoryStore::default()),
        }
    }
}
