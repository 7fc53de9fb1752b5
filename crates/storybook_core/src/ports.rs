//! crates/storybook_core/src/ports.rs
//!
//! Defines the service contracts (traits) the session flow depends on.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to stay independent of the REST client, the settings file and the audio player.

use async_trait::async_trait;
use crate::domain::{
    AppSettings, EncodedImage, Language, LearnedWord, Page, PageAudio, PageContent, PageImage,
    Session, SessionId, SessionStats, StageStatus, User, UserId, Voice,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The single failure outcome every repository call is normalized into.
/// Each variant carries a human-readable message; no structured codes reach the UI.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Missing or invalid response body: {0}")]
    MissingBody(String),
    #[error("Precondition failed: {0}")]
    Precondition(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    /// True when the backend says the requested resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PortError::NotFound(_) | PortError::Status { status: 404, .. }
        )
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Repository Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn register(&self, device_id: &str, language: &Language) -> PortResult<User>;

    async fn login(&self, device_id: &str) -> PortResult<User>;

    async fn info(&self, user_id: &UserId) -> PortResult<User>;

    async fn update_language(&self, user_id: &UserId, language: &Language) -> PortResult<User>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn start(&self, user_id: &UserId, total_pages: usize) -> PortResult<Session>;

    /// The backend's current view of a session, including whether it has been ended.
    async fn get(&self, session_id: &SessionId) -> PortResult<Session>;

    async fn select_voice(&self, session_id: &SessionId, voice: Voice) -> PortResult<Session>;

    async fn end(&self, session_id: &SessionId) -> PortResult<Session>;

    async fn discard(&self, session_id: &SessionId) -> PortResult<()>;

    /// Fetches one page of an existing session, used when resuming.
    async fn reload_page(&self, session_id: &SessionId, page_index: usize) -> PortResult<Page>;

    async fn reload_all(&self, session_id: &SessionId) -> PortResult<Vec<Page>>;

    async fn stats(&self, session_id: &SessionId) -> PortResult<SessionStats>;

    async fn pick_words(&self, session_id: &SessionId) -> PortResult<Vec<LearnedWord>>;
}

#[async_trait]
pub trait PageRepository: Send + Sync {
    async fn image(&self, session_id: &SessionId, page_index: usize) -> PortResult<PageImage>;

    async fn ocr(&self, session_id: &SessionId, page_index: usize) -> PortResult<PageContent>;

    async fn tts(&self, session_id: &SessionId, page_index: usize) -> PortResult<PageAudio>;
}

#[async_trait]
pub trait ProcessRepository: Send + Sync {
    async fn upload_image(
        &self,
        session_id: &SessionId,
        page_index: usize,
        image: &EncodedImage,
    ) -> PortResult<()>;

    async fn upload_cover(&self, session_id: &SessionId, image: &EncodedImage) -> PortResult<()>;

    async fn ocr_status(&self, session_id: &SessionId, page_index: usize)
        -> PortResult<StageStatus>;

    async fn tts_status(&self, session_id: &SessionId, page_index: usize)
        -> PortResult<StageStatus>;
}

//=========================================================================================
// Local Ports
//=========================================================================================

/// Process-wide preference storage. Writes are last-writer-wins.
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> AppSettings;

    fn set_language(&self, language: &Language) -> PortResult<()>;

    fn set_voice(&self, voice: Voice) -> PortResult<()>;

    fn set_device_id(&self, device_id: &str) -> PortResult<()>;

    fn language(&self) -> Option<Language> {
        self.load().language
    }

    fn voice(&self) -> Option<Voice> {
        self.load().voice
    }

    fn device_id(&self) -> Option<String> {
        self.load().device_id
    }
}

/// Plays the bundled voice sample. Fire-and-forget; never waits on the network.
pub trait VoicePreview: Send + Sync {
    fn play(&self, voice: Voice);
}
