//! services/client/src/viewmodel/auth.rs
//!
//! App start: log in with the device id, falling back to registration.

use crate::viewmodel::state::AppContext;
use std::sync::Arc;
use storybook_core::{PortError, PortResult, User};
use tracing::{info, warn};
use uuid::Uuid;

/// What the landing screen learned while authenticating.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub device_id: String,
    /// `None` when both login and registration failed but the policy proceeds anyway.
    pub user: Option<User>,
    pub registered: bool,
    /// Whether a language preference is already stored on the device.
    pub language_known: bool,
}

pub struct AuthViewModel {
    ctx: Arc<AppContext>,
}

impl AuthViewModel {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }

    /// The device id from config, else the stored one, else a freshly generated one.
    pub fn device_id(&self) -> PortResult<String> {
        if let Some(id) = &self.ctx.config.device_id {
            return Ok(id.clone());
        }
        if let Some(id) = self.ctx.settings.device_id() {
            return Ok(id);
        }
        let id = Uuid::new_v4().to_string();
        self.ctx.settings.set_device_id(&id)?;
        info!(device_id = %id, "Generated a new device id");
        Ok(id)
    }

    /// Logs in, registering with the default language when login fails.
    ///
    /// Under the default policy the client does not tell a new account apart
    /// from a recoverable login failure: it proceeds even if registration fails.
    pub async fn authenticate(&self, device_id: &str) -> PortResult<AuthOutcome> {
        let policy = self.ctx.config.auth_policy;
        let language_known = self.ctx.settings.language().is_some();

        let login_error = match self.ctx.users.login(device_id).await {
            Ok(user) => {
                info!(user_id = %user.id, "Logged in");
                return Ok(AuthOutcome {
                    device_id: device_id.to_string(),
                    user: Some(user),
                    registered: false,
                    language_known,
                });
            }
            Err(e) => e,
        };

        warn!(device_id, "Login failed: {}", login_error);
        if !policy.should_register(&login_error) {
            return Err(login_error);
        }

        let language = self.ctx.config.default_language.clone();
        match self.ctx.users.register(device_id, &language).await {
            Ok(user) => {
                info!(user_id = %user.id, language = %language, "Registered after failed login");
                Ok(AuthOutcome {
                    device_id: device_id.to_string(),
                    user: Some(user),
                    registered: true,
                    language_known,
                })
            }
            Err(e) if policy.proceeds_after_failed_registration() => {
                warn!(device_id, "Registration failed, continuing without a user: {}", e);
                Ok(AuthOutcome {
                    device_id: device_id.to_string(),
                    user: None,
                    registered: false,
                    language_known,
                })
            }
            Err(e) => Err(PortError::Unexpected(format!(
                "login failed ({}) and registration failed ({})",
                login_error, e
            ))),
        }
    }
}
