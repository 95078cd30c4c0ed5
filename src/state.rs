use std::path::PathBuf;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use crate::error::AppError;
use crate::model::{DeviceCommand, PlaybackState};
use crate::registry::ActionRegistry;
use crate::settings::{self, DeviceConfig};
use crate::transport::{HttpTransport, Transport};
use crate::variables::VariableStore;

// ── Toggle state ──────────────────────────────────────────────────

/// Plain copy of the session-local toggles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Toggles {
    /// `None` until the first playback toggle.
    pub playback: Option<PlaybackState>,
    pub recording: bool,
}

/// Session-local memory standing in for device state that is never queried.
///
/// Each read-modify-write below is a single critical section. No lock is held
/// across a transport await, so a commit after a response can still interleave
/// with other invocations.
#[derive(Debug, Default)]
pub struct ToggleState {
    inner: Mutex<Toggles>,
}

impl ToggleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Toggles {
        *self.inner.lock()
    }

    pub fn recording(&self) -> bool {
        self.inner.lock().recording
    }

    /// Alternate between `first` and `second`. An unset toggle is first forced
    /// to `first` and then flipped, so the very first call yields `second`.
    pub fn toggle_playback(&self, first: PlaybackState, second: PlaybackState) -> PlaybackState {
        let mut toggles = self.inner.lock();
        let current = *toggles.playback.get_or_insert(first);
        let next = if current == first { second } else { first };
        toggles.playback = Some(next);
        next
    }

    /// Apply what a successfully delivered command implies for the record toggle.
    pub fn commit(&self, command: &DeviceCommand) {
        if command.is_stop() {
            self.inner.lock().recording = false;
        } else if *command == DeviceCommand::Record {
            self.inner.lock().recording = true;
        }
    }
}

// ── Application state ─────────────────────────────────────────────

/// One running instance: configuration, registry, toggles and reported
/// variables. Dropping it is the only thing that resets the toggles.
pub struct AppState<T = HttpTransport> {
    pub config: RwLock<DeviceConfig>,
    pub registry: ActionRegistry,
    pub toggles: ToggleState,
    pub variables: VariableStore,
    pub transport: T,
    /// Where `persist_config` writes. `None` keeps config changes in memory.
    pub app_config_dir: Option<PathBuf>,
}

impl<T: Transport> AppState<T> {
    pub fn new(config: DeviceConfig, transport: T) -> Result<Self, AppError> {
        let variables = VariableStore::new();
        variables.initialize();
        Ok(Self {
            config: RwLock::new(config),
            registry: ActionRegistry::builtin()?,
            toggles: ToggleState::new(),
            variables,
            transport,
            app_config_dir: None,
        })
    }

    pub fn with_config_dir(mut self, app_config_dir: PathBuf) -> Self {
        self.app_config_dir = Some(app_config_dir);
        self
    }

    /// Snapshot of the configured host. Read once per command.
    pub fn host(&self) -> String {
        self.config.read().host.clone()
    }

    /// Replace the configuration. Toggles are left as they are.
    pub fn update_config(&self, config: DeviceConfig) {
        tracing::info!(host = %config.host, "Configuration updated");
        *self.config.write() = config;
    }

    /// Save the config to disk (when a config dir is set), then apply it.
    pub fn persist_config(&self, config: DeviceConfig) -> Result<(), AppError> {
        if let Some(dir) = &self.app_config_dir {
            settings::save_config(dir, &config)?;
        }
        self.update_config(config);
        Ok(())
    }
}

impl AppState<HttpTransport> {
    /// Instance backed by the real HTTP transport.
    pub fn with_http(config: DeviceConfig) -> Result<Self, AppError> {
        Self::new(config, HttpTransport::new()?)
    }
}
