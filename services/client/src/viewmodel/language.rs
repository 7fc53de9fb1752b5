//! services/client/src/viewmodel/language.rs

use crate::viewmodel::state::AppContext;
use std::sync::Arc;
use storybook_core::{CallSite, Language, PortResult, User, UserId};
use tracing::{info, warn};

pub struct LanguageViewModel {
    ctx: Arc<AppContext>,
}

impl LanguageViewModel {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }

    pub fn current(&self) -> Language {
        self.ctx
            .settings
            .language()
            .unwrap_or_else(|| self.ctx.config.default_language.clone())
    }

    /// Stores the language locally first, then tells the backend.
    /// Returns the updated user when there is one to update.
    pub async fn choose(
        &self,
        user_id: Option<&UserId>,
        language: &Language,
    ) -> PortResult<Option<User>> {
        let stored = language.clone();
        self.ctx
            .write_settings(move |settings| settings.set_language(&stored))
            .await?;
        info!(language = %language, "Language preference stored");

        let Some(id) = user_id else {
            return Ok(None);
        };
        match self.ctx.users.update_language(id, language).await {
            Ok(user) => Ok(Some(user)),
            Err(e) if self.ctx.policy(CallSite::UpdateLanguage).continues_after_failure() => {
                warn!(user_id = %id, "Language update failed, keeping the local choice: {}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
