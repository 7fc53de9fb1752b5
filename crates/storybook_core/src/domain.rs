//! crates/storybook_core/src/domain.rs
//!
//! Defines the pure, core data structures for the storybook reader client.
//! These structs are independent of any transport or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;

//=========================================================================================
// Identifiers
//=========================================================================================

/// Opaque session identifier issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Backend user identifier, derived from the device id on registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A language code such as `en` or `ko`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Language(pub String);

impl Language {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl Default for Language {
    fn default() -> Self {
        Self("en".to_string())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//=========================================================================================
// Voice
//=========================================================================================

/// The narrator voice used for a session's text-to-speech audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Voice {
    Male,
    Female,
}

impl Voice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Voice::Male => "male",
            Voice::Female => "female",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "male" => Some(Voice::Male),
            "female" => Some(Voice::Female),
            _ => None,
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//=========================================================================================
// Session, Page and User
//=========================================================================================

/// One end-to-end reading interaction, spanning capture through finish/save.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub current_page: usize,
    pub total_pages: usize,
    pub voice: Option<Voice>,
    pub completed: bool,
}

impl Session {
    /// A session is active until it has been ended. Discarded sessions no longer exist.
    pub fn is_active(&self) -> bool {
        !self.completed
    }
}

/// Processing status of one backend stage (OCR or TTS) for a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Pending,
    Ready,
    Failed,
}

impl StageStatus {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "ready" | "done" | "completed" => StageStatus::Ready,
            "failed" | "error" => StageStatus::Failed,
            _ => StageStatus::Pending,
        }
    }
}

/// One captured book page and its derived artifacts.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub session_id: SessionId,
    pub index: usize,
    pub image: Option<String>,
    pub ocr_text: Option<String>,
    pub translated_text: Option<String>,
    pub audio: Vec<String>,
    pub ocr_status: StageStatus,
    pub tts_status: StageStatus,
}

impl Page {
    pub fn is_ready(&self) -> bool {
        self.ocr_status == StageStatus::Ready && self.tts_status == StageStatus::Ready
    }
}

/// OCR output and its translation for a single page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    pub ocr_text: String,
    pub translated_text: String,
}

/// Text-to-speech audio references for a single page, one clip per sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageAudio {
    pub clips: Vec<String>,
}

/// A page image reference as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub language: Language,
    pub voice: Option<Voice>,
    pub current_session: Option<SessionId>,
}

//=========================================================================================
// Finish Screen Data
//=========================================================================================

/// Aggregated reading statistics for a finished session, copied verbatim from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub total_pages: u32,
    pub total_words_read: u32,
    /// Seconds spent in the session.
    pub total_time_spent: u64,
}

impl SessionStats {
    /// Pages actually read; the cover page does not count.
    pub fn pages_read(&self) -> u32 {
        self.total_pages.saturating_sub(1)
    }
}

/// A vocabulary word picked from the session for the learned-words summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnedWord {
    pub word: String,
    pub meaning: String,
    pub page_index: Option<usize>,
}

//=========================================================================================
// Local Data
//=========================================================================================

/// A page image after downscaling, JPEG compression and Base64 encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub base64: String,
    pub width: u32,
    pub height: u32,
}

/// Process-wide user preferences persisted on the device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppSettings {
    pub language: Option<Language>,
    pub voice: Option<Voice>,
    pub device_id: Option<String>,
}
