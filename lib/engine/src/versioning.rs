use crate::persistence::LocalStorage;
use legal_secretary_prelude::Revision;

/// Reads and bumps the revision counter. Every bump is persisted before it is
/// returned, so `increment` has to be treated as a write.
#[derive(Clone, Debug)]
pub struct Versioning {
    storage: LocalStorage,
}

impl Versioning {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    /// Stored revision, or `1.0.0` when missing or unreadable.
    pub fn stored(&self) -> Revision {
        self.storage
            .load_revision()
            .and_then(|raw| {
                raw.parse()
                    .map_err(|err| tracing::warn!("ignoring stored revision: {}", err))
                    .ok()
            })
            .unwrap_or(Revision::INITIAL)
    }

    /// Next revision after `current`, or `1.0.1` when `current` is malformed.
    pub fn increment(&self, current: &str) -> Revision {
        let next = match current.parse::<Revision>() {
            Ok(revision) => revision.next(),
            Err(err) => {
                tracing::warn!("resetting revision: {}", err);
                Revision::RECOVERY
            }
        };
        self.storage.save_revision(&next);
        next
    }
}
