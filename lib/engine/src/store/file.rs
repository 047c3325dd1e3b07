use super::Error;
use std::io::ErrorKind;
use std::path::PathBuf;

#[derive(Clone, Debug, serde::Deserialize)]
pub struct Config {
    pub path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::new().join("data"),
        }
    }
}

impl Config {
    pub fn build(&self) -> FileStore {
        FileStore::new(self.path.clone())
    }
}

/// One file per key in a single directory.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl super::Store for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, Error> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::Read {
                key: key.to_string(),
                source: err,
            }),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), Error> {
        let write_error = |source| Error::Write {
            key: key.to_string(),
            source,
        };
        std::fs::create_dir_all(&self.root).map_err(write_error)?;
        std::fs::write(self.path(key), value).map_err(write_error)
    }
}
