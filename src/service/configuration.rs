#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub engine: legal_secretary_engine::Config,
}

impl Configuration {
    /// Reads the optional toml file, then `LEGAL_SECRETARY__*` variables.
    pub fn from_path(path: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("LEGAL_SECRETARY")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::Configuration;
    use legal_secretary_engine::store;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let config = Configuration::from_path(path.to_str().unwrap()).unwrap();
        assert_eq!(config.engine.debounce_ms, 2000);
        assert!(matches!(config.engine.store, store::Config::File(_)));
    }

    #[test]
    fn should_read_toml_file() {
        crate::try_init_logs();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legal-secretary.toml");
        std::fs::write(
            &path,
            "[engine]\ndebounce_ms = 500\n\n[engine.store]\ntype = \"file\"\npath = \"/var/lib/legal-secretary\"\n",
        )
        .unwrap();
        let config = Configuration::from_path(path.to_str().unwrap()).unwrap();
        assert_eq!(config.engine.debounce_ms, 500);
        match config.engine.store {
            store::Config::File(inner) => {
                assert_eq!(inner.path.to_str(), Some("/var/lib/legal-secretary"))
            }
            other => panic!("unexpected store {other:?}"),
        }
    }

    #[test]
    fn should_read_memory_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legal-secretary.toml");
        std::fs::write(&path, "[engine.store]\ntype = \"memory\"\n").unwrap();
        let config = Configuration::from_path(path.to_str().unwrap()).unwrap();
        assert!(matches!(config.engine.store, store::Config::Memory));
    }
}
