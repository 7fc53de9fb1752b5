//! services/client/src/repository/protocol.rs
//!
//! Defines the JSON payloads exchanged with the storybook backend, and their
//! conversions into the core domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storybook_core::{
    EncodedImage, Language, LearnedWord, Page, PageAudio, PageContent, PageImage, Session,
    SessionId, SessionStats, StageStatus, User, UserId, Voice,
};

//=========================================================================================
// Endpoint Paths
//=========================================================================================

pub const USER_REGISTER: [&str; 2] = ["users", "register"];
pub const USER_LOGIN: [&str; 2] = ["users", "login"];
pub const SESSIONS: [&str; 1] = ["sessions"];
pub const PROCESS_UPLOAD: [&str; 2] = ["process", "upload"];
pub const PROCESS_COVER: [&str; 2] = ["process", "cover"];

// Ids travel as single path segments; `RestClient` encodes them.

pub fn user_path(user_id: &UserId) -> Vec<String> {
    vec!["users".to_string(), user_id.to_string()]
}

pub fn user_language_path(user_id: &UserId) -> Vec<String> {
    vec!["users".to_string(), user_id.to_string(), "language".to_string()]
}

pub fn session_path(session_id: &SessionId) -> Vec<String> {
    vec!["sessions".to_string(), session_id.to_string()]
}

pub fn session_action_path(session_id: &SessionId, action: &str) -> Vec<String> {
    let mut path = session_path(session_id);
    path.extend(action.split('/').map(str::to_string));
    path
}

pub fn session_page_reload_path(session_id: &SessionId, page_index: usize) -> Vec<String> {
    let mut path = session_path(session_id);
    path.extend(["pages".to_string(), page_index.to_string(), "reload".to_string()]);
    path
}

pub fn page_path(session_id: &SessionId, page_index: usize, resource: &str) -> Vec<String> {
    vec![
        "pages".to_string(),
        session_id.to_string(),
        page_index.to_string(),
        resource.to_string(),
    ]
}

pub fn process_status_path(session_id: &SessionId, page_index: usize, stage: &str) -> Vec<String> {
    vec![
        "process".to_string(),
        session_id.to_string(),
        page_index.to_string(),
        format!("{}-status", stage),
    ]
}

//=========================================================================================
// Requests
//=========================================================================================

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterRequest {
    pub device_id: String,
    pub language: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub device_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LanguageRequest {
    pub language: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StartSessionRequest {
    pub user_id: String,
    pub total_pages: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SelectVoiceRequest {
    pub voice: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UploadRequest {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub page_index: Option<usize>,
    pub image_base64: String,
    pub width: u32,
    pub height: u32,
}

impl UploadRequest {
    pub fn page(session_id: &SessionId, page_index: usize, image: &EncodedImage) -> Self {
        Self {
            session_id: session_id.to_string(),
            page_index: Some(page_index),
            image_base64: image.base64.clone(),
            width: image.width,
            height: image.height,
        }
    }

    pub fn cover(session_id: &SessionId, image: &EncodedImage) -> Self {
        Self {
            session_id: session_id.to_string(),
            page_index: None,
            image_base64: image.base64.clone(),
            width: image.width,
            height: image.height,
        }
    }
}

//=========================================================================================
// Responses
//=========================================================================================

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserResponse {
    pub user_id: String,
    pub language: String,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub current_session_id: Option<String>,
}

impl UserResponse {
    pub fn into_domain(self) -> User {
        User {
            id: UserId(self.user_id),
            language: Language(self.language),
            voice: self.voice.as_deref().and_then(Voice::parse),
            current_session: self.current_session_id.map(SessionId),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SessionResponse {
    pub session_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub current_page: usize,
    pub total_pages: usize,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl SessionResponse {
    pub fn into_domain(self) -> Session {
        Session {
            id: SessionId(self.session_id),
            user_id: UserId(self.user_id),
            created_at: self.created_at,
            current_page: self.current_page,
            total_pages: self.total_pages,
            voice: self.voice.as_deref().and_then(Voice::parse),
            completed: self.completed,
        }
    }
}

/// Acknowledgement body for calls without a domain payload (discard, uploads).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AckResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PageResponse {
    pub session_id: String,
    pub page_index: usize,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub ocr_text: Option<String>,
    #[serde(default)]
    pub translated_text: Option<String>,
    #[serde(default)]
    pub audio_urls: Vec<String>,
    #[serde(default)]
    pub ocr_status: Option<String>,
    #[serde(default)]
    pub tts_status: Option<String>,
}

impl PageResponse {
    pub fn into_domain(self) -> Page {
        let status = |s: Option<String>| {
            s.as_deref()
                .map(StageStatus::parse)
                .unwrap_or(StageStatus::Pending)
        };
        Page {
            session_id: SessionId(self.session_id),
            index: self.page_index,
            image: self.image_url,
            ocr_text: self.ocr_text,
            translated_text: self.translated_text,
            audio: self.audio_urls,
            ocr_status: status(self.ocr_status),
            tts_status: status(self.tts_status),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PagesResponse {
    pub pages: Vec<PageResponse>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StatsResponse {
    pub total_pages: u32,
    pub total_words_read: u32,
    pub total_time_spent: u64,
}

impl StatsResponse {
    pub fn into_domain(self) -> SessionStats {
        SessionStats {
            total_pages: self.total_pages,
            total_words_read: self.total_words_read,
            total_time_spent: self.total_time_spent,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WordResponse {
    pub word: String,
    #[serde(default)]
    pub meaning: String,
    #[serde(default)]
    pub page_index: Option<usize>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WordsResponse {
    pub words: Vec<WordResponse>,
}

impl WordsResponse {
    pub fn into_domain(self) -> Vec<LearnedWord> {
        self.words
            .into_iter()
            .map(|w| LearnedWord {
                word: w.word,
                meaning: w.meaning,
                page_index: w.page_index,
            })
            .collect()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ImageResponse {
    pub image_url: String,
}

impl ImageResponse {
    pub fn into_domain(self) -> PageImage {
        PageImage {
            url: self.image_url,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OcrResponse {
    pub ocr_text: String,
    #[serde(default)]
    pub translated_text: String,
}

impl OcrResponse {
    pub fn into_domain(self) -> PageContent {
        PageContent {
            ocr_text: self.ocr_text,
            translated_text: self.translated_text,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TtsResponse {
    pub audio_urls: Vec<String>,
}

impl TtsResponse {
    pub fn into_domain(self) -> PageAudio {
        PageAudio {
            clips: self.audio_urls,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn into_domain(self) -> StageStatus {
        StageStatus::parse(&self.status)
    }
}
