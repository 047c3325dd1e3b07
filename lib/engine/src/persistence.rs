//! Mirrors the template collection, the revision and the cloud settings into
//! the local store. Nothing here fails the caller: storage errors are logged
//! and reads fall back to defaults.

use crate::store::Store;
use legal_secretary_prelude::{CloudConfig, Revision, Template};
use std::sync::Arc;

pub const TEMPLATES_KEY: &str = "legal_templates";
pub const VERSION_KEY: &str = "legal_app_version";
pub const CLOUD_CONFIG_KEY: &str = "legal_cloud_config";

#[derive(Clone, Debug)]
pub struct LocalStorage {
    store: Arc<dyn Store>,
}

impl LocalStorage {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    fn read(&self, key: &str) -> Option<String> {
        self.store.load(key).unwrap_or_else(|err| {
            metrics::counter!("storage_error", "operation" => "read").increment(1);
            tracing::warn!("local storage error: {}", err);
            None
        })
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(err) = self.store.save(key, value) {
            metrics::counter!("storage_error", "operation" => "write").increment(1);
            tracing::warn!("local storage error: {}", err);
        }
    }

    fn write_json<T: serde::Serialize + ?Sized>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(encoded) => self.write(key, &encoded),
            Err(err) => tracing::warn!("unable to serialize {}: {:?}", key, err),
        }
    }

    /// Falls back to the built-in seed when nothing readable is stored.
    pub fn load_templates(&self) -> Vec<Template> {
        let Some(raw) = self.read(TEMPLATES_KEY) else {
            tracing::debug!("no stored templates, using seed");
            return crate::seed::templates();
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            tracing::warn!("stored templates are invalid, using seed: {:?}", err);
            crate::seed::templates()
        })
    }

    pub fn save_templates(&self, templates: &[Template]) {
        self.write_json(TEMPLATES_KEY, templates);
    }

    pub fn load_revision(&self) -> Option<String> {
        self.read(VERSION_KEY)
    }

    pub fn save_revision(&self, revision: &Revision) {
        self.write(VERSION_KEY, &revision.to_string());
    }

    pub fn load_cloud_config(&self) -> CloudConfig {
        self.read(CLOUD_CONFIG_KEY)
            .and_then(|raw| {
                serde_json::from_str(&raw)
                    .map_err(|err| tracing::warn!("stored cloud config is invalid: {:?}", err))
                    .ok()
            })
            .unwrap_or_default()
    }

    pub fn save_cloud_config(&self, config: &CloudConfig) {
        self.write_json(CLOUD_CONFIG_KEY, config);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{LocalStorage, CLOUD_CONFIG_KEY, TEMPLATES_KEY};
    use crate::store::memory::MemoryStore;
    use crate::store::{Error, Store};
    use legal_secretary_prelude::{CloudConfig, Template};
    use std::sync::Arc;

    pub(crate) fn template(id: &str) -> Template {
        Template {
            id: id.into(),
            name: format!("template {id}"),
            category: "Contracts".into(),
            description: String::new(),
            structure: "Signed by {{NAME}}".into(),
            placeholders: vec!["NAME".into()],
            created_at: 1,
            original_file: None,
        }
    }

    #[derive(Debug)]
    struct BrokenStore;

    impl Store for BrokenStore {
        fn load(&self, key: &str) -> Result<Option<String>, Error> {
            Err(Error::Read {
                key: key.into(),
                source: std::io::ErrorKind::PermissionDenied.into(),
            })
        }

        fn save(&self, key: &str, _value: &str) -> Result<(), Error> {
            Err(Error::Write {
                key: key.into(),
                source: std::io::ErrorKind::PermissionDenied.into(),
            })
        }
    }

    #[test]
    fn should_use_seed_when_empty() {
        let storage = LocalStorage::new(Arc::new(MemoryStore::default()));
        assert_eq!(storage.load_templates(), crate::seed::templates());
    }

    #[test]
    fn should_use_seed_when_unparsable() {
        let store = MemoryStore::default().with(TEMPLATES_KEY, "{not json");
        let storage = LocalStorage::new(Arc::new(store));
        assert_eq!(storage.load_templates(), crate::seed::templates());
    }

    #[test]
    fn should_read_back_saved_templates() {
        let storage = LocalStorage::new(Arc::new(MemoryStore::default()));
        storage.save_templates(&[template("a"), template("b")]);
        let loaded = storage.load_templates();
        assert_eq!(loaded, vec![template("a"), template("b")]);
    }

    #[test]
    fn should_read_back_cloud_config() {
        let storage = LocalStorage::new(Arc::new(MemoryStore::default()));
        assert_eq!(storage.load_cloud_config(), CloudConfig::default());
        let config = CloudConfig {
            endpoint: "https://example.com/b/1".into(),
            api_key: "secret".into(),
        };
        storage.save_cloud_config(&config);
        assert_eq!(storage.load_cloud_config(), config);
    }

    #[test]
    fn invalid_cloud_config_falls_back_to_default() {
        let store = MemoryStore::default().with(CLOUD_CONFIG_KEY, "[]");
        let storage = LocalStorage::new(Arc::new(store));
        assert_eq!(storage.load_cloud_config(), CloudConfig::default());
    }

    #[test]
    fn storage_errors_are_swallowed() {
        let storage = LocalStorage::new(Arc::new(BrokenStore));
        storage.save_templates(&[template("a")]);
        assert_eq!(storage.load_templates(), crate::seed::templates());
        assert!(storage.load_revision().is_none());
    }
}
