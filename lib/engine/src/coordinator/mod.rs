//! Owner of the live template collection and revision.
//!
//! Mutations are applied to the in-memory state right away and mirrored to
//! local storage before returning. Remote sync runs in background tasks:
//! a fetch when an endpoint gets configured, a debounced push after changes.
//! Nothing serializes a fetch against a push, the last one to complete wins.

mod debounce;

use crate::backup::{self, ExportFile, ImportError};
use crate::persistence::LocalStorage;
use crate::remote::{self, Remote};
use crate::versioning::Versioning;
use debounce::{Cancel, Debounce};
use legal_secretary_prelude::{CloudConfig, CloudData, RemoteSnapshot, Revision, Template};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Clone, Debug)]
pub struct Options {
    pub debounce: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            debounce: Duration::from_secs(2),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncStatus {
    /// No endpoint configured.
    Disabled,
    Idle,
    Syncing,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncState {
    pub status: SyncStatus,
    /// Message of the last failed sync, cleared by the next successful one.
    pub last_error: Option<String>,
    pub last_synced_at: Option<i64>,
}

#[derive(Debug)]
struct AppState {
    templates: Vec<Template>,
    revision: Revision,
    cloud: CloudConfig,
}

#[derive(Debug)]
struct Inner {
    storage: LocalStorage,
    versioning: Versioning,
    remote: Arc<dyn Remote>,
    options: Options,
    state: Mutex<AppState>,
    debounce: Mutex<Debounce>,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
    running: Mutex<usize>,
    sync: watch::Sender<SyncState>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn now() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Clone, Debug)]
pub struct Coordinator(Arc<Inner>);

impl Coordinator {
    /// Restores the persisted state and starts the initial fetch when an
    /// endpoint is configured. Must be called from within a tokio runtime.
    pub fn load(storage: LocalStorage, remote: Arc<dyn Remote>, options: Options) -> Self {
        let versioning = Versioning::new(storage.clone());
        let state = AppState {
            templates: storage.load_templates(),
            revision: versioning.stored(),
            cloud: storage.load_cloud_config(),
        };
        tracing::debug!(
            "loaded {} templates at revision {}",
            state.templates.len(),
            state.revision
        );
        let enabled = state.cloud.is_enabled();
        let (sync, _) = watch::channel(SyncState {
            status: if enabled {
                SyncStatus::Idle
            } else {
                SyncStatus::Disabled
            },
            last_error: None,
            last_synced_at: None,
        });
        let this = Self(Arc::new(Inner {
            storage,
            versioning,
            remote,
            options,
            state: Mutex::new(state),
            debounce: Mutex::new(Debounce::default()),
            in_flight: Mutex::new(Vec::new()),
            running: Mutex::new(0),
            sync,
        }));
        if enabled {
            this.spawn_fetch();
        }
        this
    }

    pub fn templates(&self) -> Vec<Template> {
        lock(&self.0.state).templates.clone()
    }

    pub fn find(&self, id: &str) -> Option<Template> {
        lock(&self.0.state)
            .templates
            .iter()
            .find(|item| item.id == id)
            .cloned()
    }

    pub fn revision(&self) -> Revision {
        lock(&self.0.state).revision
    }

    pub fn cloud_config(&self) -> CloudConfig {
        lock(&self.0.state).cloud.clone()
    }

    pub fn sync_state(&self) -> SyncState {
        self.0.sync.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.0.sync.subscribe()
    }

    fn bump(&self, state: &mut AppState) -> Revision {
        state.revision = self.0.versioning.increment(&state.revision.to_string());
        state.revision
    }

    /// Inserts the template first and returns the new revision.
    pub fn add(&self, template: Template) -> Revision {
        tracing::debug!("adding template {}", template.id);
        let revision = {
            let mut state = lock(&self.0.state);
            state.templates.insert(0, template);
            self.0.storage.save_templates(&state.templates);
            self.bump(&mut state)
        };
        self.schedule_save();
        revision
    }

    /// Removes every template with this id. The revision is bumped even when
    /// nothing matched. Returns whether something was removed.
    pub fn delete(&self, id: &str) -> bool {
        tracing::debug!("deleting template {}", id);
        let removed = {
            let mut state = lock(&self.0.state);
            let before = state.templates.len();
            state.templates.retain(|item| item.id != id);
            let removed = state.templates.len() != before;
            self.0.storage.save_templates(&state.templates);
            self.bump(&mut state);
            removed
        };
        self.schedule_save();
        removed
    }

    /// Swaps the whole library at once, keeping the given revision.
    pub fn replace(&self, templates: Vec<Template>, revision: Revision) {
        tracing::debug!(
            "replacing library with {} templates at revision {}",
            templates.len(),
            revision
        );
        {
            let mut state = lock(&self.0.state);
            state.templates = templates;
            state.revision = revision;
            self.0.storage.save_templates(&state.templates);
            self.0.storage.save_revision(&state.revision);
        }
        self.schedule_save();
    }

    /// Leaves the state untouched when the backup is rejected.
    pub fn import_backup(&self, text: &str) -> Result<Revision, ImportError> {
        let imported = backup::import(text)?;
        self.replace(imported.templates, imported.version);
        Ok(imported.version)
    }

    pub fn export_backup(&self) -> Result<ExportFile, serde_json::Error> {
        let (templates, revision) = {
            let state = lock(&self.0.state);
            (state.templates.clone(), state.revision)
        };
        backup::export(&templates, revision)
    }

    /// Stores the remote settings. A new non empty endpoint triggers a fetch,
    /// an empty one disables the sync and drops any pending push.
    pub fn configure(&self, config: CloudConfig) {
        let previous = {
            let mut state = lock(&self.0.state);
            self.0.storage.save_cloud_config(&config);
            std::mem::replace(&mut state.cloud, config.clone())
        };
        if !config.is_enabled() {
            tracing::info!("remote sync disabled");
            let _ = lock(&self.0.debounce).cancel();
            self.update_status();
            return;
        }
        if previous.endpoint.trim() != config.endpoint.trim() {
            tracing::info!("remote endpoint changed, fetching");
            self.spawn_fetch();
        } else {
            self.update_status();
        }
        if lock(&self.0.debounce).is_pending() {
            self.schedule_save();
        }
    }

    /// Fetches and applies the remote state, waiting for the result.
    pub async fn pull(&self) -> Result<(), remote::Error> {
        let config = self.cloud_config();
        if !config.is_enabled() {
            return Err(remote::Error::Disabled);
        }
        self.fetch_with(config).await
    }

    /// Pushes the current state right away, dropping any pending push.
    pub async fn push(&self) -> Result<(), remote::Error> {
        let _ = lock(&self.0.debounce).cancel();
        let (config, data) = self.snapshot();
        if !config.is_enabled() {
            return Err(remote::Error::Disabled);
        }
        self.save_with(config, data).await
    }

    /// Fires a pending push now and waits for every sync task to complete.
    pub async fn flush(&self) {
        let cancel = lock(&self.0.debounce).cancel();
        match cancel {
            Cancel::Stopped => self.spawn_save(),
            Cancel::Fired(handle) => {
                if let Err(err) = handle.await {
                    tracing::error!("debounce task failed: {:?}", err);
                }
            }
            Cancel::Idle => {}
        }
        self.settle().await;
    }

    /// Waits for the sync tasks already running, the startup fetch included,
    /// without firing a pending push. Mutations made after this returns can't
    /// be overwritten by those fetches.
    pub async fn settle(&self) {
        loop {
            let handles = std::mem::take(&mut *lock(&self.0.in_flight));
            if handles.is_empty() {
                break;
            }
            for handle in handles {
                if let Err(err) = handle.await {
                    tracing::error!("sync task failed: {:?}", err);
                }
            }
        }
    }

    fn snapshot(&self) -> (CloudConfig, CloudData) {
        let state = lock(&self.0.state);
        (
            state.cloud.clone(),
            CloudData {
                version: state.revision,
                templates: state.templates.clone(),
                last_updated: now(),
            },
        )
    }

    fn schedule_save(&self) {
        if !lock(&self.0.state).cloud.is_enabled() {
            return;
        }
        tracing::debug!("scheduling push in {:?}", self.0.options.debounce);
        let this = self.clone();
        lock(&self.0.debounce).schedule(self.0.options.debounce, async move {
            this.spawn_save();
        });
    }

    fn track(&self, handle: JoinHandle<()>) {
        let mut in_flight = lock(&self.0.in_flight);
        in_flight.retain(|item| !item.is_finished());
        in_flight.push(handle);
    }

    /// The push is detached from the debounce timer so a later reschedule
    /// never aborts a request already on the wire.
    fn spawn_save(&self) {
        let (config, data) = self.snapshot();
        if !config.is_enabled() {
            return;
        }
        let this = self.clone();
        self.track(tokio::spawn(async move {
            let _ = this.save_with(config, data).await;
        }));
    }

    fn spawn_fetch(&self) {
        let config = self.cloud_config();
        let this = self.clone();
        self.track(tokio::spawn(async move {
            let _ = this.fetch_with(config).await;
        }));
    }

    async fn fetch_with(&self, config: CloudConfig) -> Result<(), remote::Error> {
        self.begin_sync();
        let result = self.0.remote.fetch(&config).await;
        let result = result.map(|snapshot| self.apply(snapshot));
        self.end_sync("fetch", &result);
        result
    }

    async fn save_with(&self, config: CloudConfig, data: CloudData) -> Result<(), remote::Error> {
        self.begin_sync();
        let result = self.0.remote.save(&config, &data).await;
        self.end_sync("push", &result);
        result
    }

    /// The remote is trusted: every well formed field overwrites local state.
    fn apply(&self, snapshot: RemoteSnapshot) {
        let mut state = lock(&self.0.state);
        if let Some(mut templates) = snapshot.templates {
            crate::draft::assign_missing_ids(&mut templates);
            tracing::debug!("applying {} remote templates", templates.len());
            state.templates = templates;
            self.0.storage.save_templates(&state.templates);
        }
        match snapshot.version.map(|raw| raw.parse::<Revision>()) {
            Some(Ok(revision)) => {
                state.revision = revision;
                self.0.storage.save_revision(&revision);
            }
            Some(Err(err)) => tracing::warn!("ignoring remote revision: {}", err),
            None => {}
        }
    }

    fn begin_sync(&self) {
        *lock(&self.0.running) += 1;
        self.0.sync.send_modify(|state| state.status = SyncStatus::Syncing);
    }

    fn end_sync(&self, operation: &'static str, result: &Result<(), remote::Error>) {
        {
            let mut running = lock(&self.0.running);
            *running = running.saturating_sub(1);
        }
        match result {
            Ok(()) => {
                metrics::counter!("sync_success", "operation" => operation).increment(1);
                tracing::info!("{} succeeded", operation);
                self.0.sync.send_modify(|state| {
                    state.last_error = None;
                    state.last_synced_at = Some(now());
                });
            }
            Err(err) => {
                metrics::counter!("sync_error", "operation" => operation).increment(1);
                tracing::warn!("{} failed: {}", operation, err);
                let message = err.to_string();
                self.0
                    .sync
                    .send_modify(|state| state.last_error = Some(message));
            }
        }
        self.update_status();
    }

    fn update_status(&self) {
        let status = if *lock(&self.0.running) > 0 {
            SyncStatus::Syncing
        } else if lock(&self.0.state).cloud.is_enabled() {
            SyncStatus::Idle
        } else {
            SyncStatus::Disabled
        };
        self.0.sync.send_if_modified(|state| {
            let changed = state.status != status;
            state.status = status;
            changed
        });
    }
}
