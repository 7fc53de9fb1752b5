//! services/client/src/viewmodel/state.rs
//!
//! Defines the shared application context handed to every view model, and the
//! per-screen scope that cancels in-flight work when a screen goes away.

use crate::adapters::{default_settings_path, AssetVoicePreview, JsonSettingsStore};
use crate::config::Config;
use crate::error::ClientError;
use crate::repository::{
    HttpPageRepository, HttpProcessRepository, HttpSessionRepository, HttpUserRepository,
    RestClient,
};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use storybook_core::{
    CallSite, FailurePolicy, PageRepository, PolicyTable, PortError, PortResult,
    ProcessRepository, SessionRepository, SettingsStore, UserRepository, VoicePreview,
};
use tokio_util::sync::CancellationToken;

//=========================================================================================
// AppContext (Shared Across All Screens)
//=========================================================================================

/// The shared application context, created once at startup and passed to all view models.
#[derive(Clone)]
pub struct AppContext {
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub pages: Arc<dyn PageRepository>,
    pub process: Arc<dyn ProcessRepository>,
    pub settings: Arc<dyn SettingsStore>,
    pub preview: Arc<dyn VoicePreview>,
    pub policies: PolicyTable,
    pub config: Arc<Config>,
}

impl AppContext {
    /// Wires the HTTP repositories, the settings file and the voice preview from config.
    pub fn from_config(config: Arc<Config>) -> Result<Self, ClientError> {
        let client = RestClient::new(&config.api_base_url, config.request_timeout)?;
        let settings_path = config
            .settings_path
            .clone()
            .unwrap_or_else(default_settings_path);

        Ok(Self {
            users: Arc::new(HttpUserRepository::new(client.clone())),
            sessions: Arc::new(HttpSessionRepository::new(client.clone())),
            pages: Arc::new(HttpPageRepository::new(client.clone())),
            process: Arc::new(HttpProcessRepository::new(client)),
            settings: Arc::new(JsonSettingsStore::open(settings_path)),
            preview: Arc::new(AssetVoicePreview::logging(config.assets_path.clone())),
            policies: config.policy_table(),
            config,
        })
    }

    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    pub fn policy(&self, site: CallSite) -> FailurePolicy {
        self.policies.for_call(site)
    }

    /// Runs a settings write on the blocking pool; the store writes its file synchronously.
    pub async fn write_settings<F>(&self, write: F) -> PortResult<()>
    where
        F: FnOnce(&dyn SettingsStore) -> PortResult<()> + Send + 'static,
    {
        let settings = self.settings.clone();
        tokio::task::spawn_blocking(move || write(settings.as_ref()))
            .await
            .map_err(|e| PortError::Unexpected(format!("settings write task failed: {}", e)))?
    }
}

//=========================================================================================
// ScreenScope (Specific to One Screen)
//=========================================================================================

/// Ties asynchronous work to a screen's lifetime. Dropping the scope cancels it.
#[derive(Debug, Default)]
pub struct ScreenScope {
    token: CancellationToken,
}

impl ScreenScope {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Runs `fut` unless the screen is torn down first.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, ClientError> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(ClientError::Cancelled),
            output = fut => Ok(output),
        }
    }

    /// Sleeps for `delay`, returning early with `Cancelled` when the screen goes away.
    pub async fn sleep(&self, delay: Duration) -> Result<(), ClientError> {
        self.run(tokio::time::sleep(delay)).await
    }
}

impl Drop for ScreenScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

//=========================================================================================
// In-Flight Guard
//=========================================================================================

/// Coalesces repeated user actions: while one call is in flight, later ones are ignored.
#[derive(Debug, Default)]
pub struct InFlight {
    busy: AtomicBool,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a guard if no call is in flight; the flag clears when the guard drops.
    pub fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        if self.busy.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(InFlightGuard { flag: &self.busy })
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

pub struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_refused_until_guard_drops() {
        let in_flight = InFlight::new();
        let guard = in_flight.try_begin();
        assert!(guard.is_some());
        assert!(in_flight.try_begin().is_none());
        drop(guard);
        assert!(!in_flight.is_busy());
        assert!(in_flight.try_begin().is_some());
    }

    #[tokio::test]
    async fn cancelled_scope_interrupts_sleep() {
        let scope = ScreenScope::new();
        scope.cancel();
        let result = scope.sleep(Duration::from_secs(60)).await;
        assert!(matches!(result, Err(ClientError::Cancelled)));
    }

    #[tokio::test]
    async fn dropping_scope_cancels_its_token() {
        let scope = ScreenScope::new();
        let token = scope.token();
        drop(scope);
        assert!(token.is_cancelled());
    }
}
