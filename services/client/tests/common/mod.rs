//! Shared fakes for the view-model tests: an in-memory backend that records
//! every repository call, an in-memory settings store and a recording preview.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use storybook_client_lib::config::Config;
use storybook_client_lib::viewmodel::AppContext;
use storybook_core::{
    AppSettings, CallSite, FailurePolicy, EncodedImage, Language, LearnedWord, Page, PageAudio, PageContent, PageImage,
    PageRepository, PortError, PortResult, ProcessRepository, Session, SessionId,
    SessionRepository, SessionStats, SettingsStore, StageStatus, User, UserId, UserRepository,
    Voice, VoicePreview,
};

/// Knobs that decide how the fake backend answers.
#[derive(Debug, Clone)]
pub struct Script {
    pub login_error: Option<PortError>,
    pub register_error: Option<PortError>,
    pub current_session: Option<SessionId>,
    pub completed_sessions: Vec<SessionId>,
    pub prior_total_pages: usize,
    pub select_voice_failures: u32,
    pub select_voice_delay: Duration,
    pub end_fails: bool,
    pub stats_failures: u32,
    pub stats: SessionStats,
    pub words_fail: bool,
    pub words: Vec<LearnedWord>,
    pub discard_fails: bool,
    pub discard_delay: Duration,
    pub ocr_failures: u32,
    pub ocr_ready_after: u32,
    pub tts_ready_after: u32,
    pub tts_fails: bool,
    pub reload_pages: Vec<Page>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            login_error: None,
            register_error: None,
            current_session: None,
            completed_sessions: Vec::new(),
            prior_total_pages: 5,
            select_voice_failures: 0,
            select_voice_delay: Duration::ZERO,
            end_fails: false,
            stats_failures: 0,
            stats: SessionStats {
                total_pages: 5,
                total_words_read: 87,
                total_time_spent: 420,
            },
            words_fail: false,
            words: vec![LearnedWord {
                word: "rabbit".to_string(),
                meaning: "토끼".to_string(),
                page_index: Some(2),
            }],
            discard_fails: false,
            discard_delay: Duration::ZERO,
            ocr_failures: 0,
            ocr_ready_after: 1,
            tts_ready_after: 1,
            tts_fails: false,
            reload_pages: Vec::new(),
        }
    }
}

#[derive(Default)]
pub struct FakeBackend {
    pub script: Mutex<Script>,
    calls: Mutex<Vec<String>>,
    select_voice_calls: AtomicU32,
    stats_calls: AtomicU32,
    ocr_polls: AtomicU32,
    ocr_errors: AtomicU32,
    tts_polls: AtomicU32,
}

impl FakeBackend {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script),
            ..Default::default()
        })
    }

    fn script(&self) -> Script {
        self.script.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn user(&self, id: &str, language: &str) -> User {
        User {
            id: UserId::new(id),
            language: Language::new(language),
            voice: None,
            current_session: self.script().current_session,
        }
    }

    fn session(&self, id: &SessionId, total_pages: usize, completed: bool) -> Session {
        Session {
            id: id.clone(),
            user_id: UserId::new("u1"),
            created_at: Utc::now(),
            current_page: 0,
            total_pages,
            voice: None,
            completed,
        }
    }
}

#[async_trait]
impl UserRepository for FakeBackend {
    async fn register(&self, device_id: &str, language: &Language) -> PortResult<User> {
        self.record(format!("register:{}:{}", device_id, language));
        match self.script().register_error {
            Some(e) => Err(e),
            None => Ok(self.user("u1", language.code())),
        }
    }

    async fn login(&self, device_id: &str) -> PortResult<User> {
        self.record(format!("login:{}", device_id));
        match self.script().login_error {
            Some(e) => Err(e),
            None => Ok(self.user("u1", "en")),
        }
    }

    async fn info(&self, user_id: &UserId) -> PortResult<User> {
        self.record(format!("info:{}", user_id));
        Ok(self.user(user_id.as_str(), "en"))
    }

    async fn update_language(&self, user_id: &UserId, language: &Language) -> PortResult<User> {
        self.record(format!("update_language:{}:{}", user_id, language));
        Ok(self.user(user_id.as_str(), language.code()))
    }
}

#[async_trait]
impl SessionRepository for FakeBackend {
    async fn start(&self, user_id: &UserId, total_pages: usize) -> PortResult<Session> {
        self.record(format!("start:{}:{}", user_id, total_pages));
        Ok(self.session(&SessionId::new("s1"), total_pages, false))
    }

    async fn get(&self, session_id: &SessionId) -> PortResult<Session> {
        self.record(format!("session:{}", session_id));
        let script = self.script();
        let completed = script.completed_sessions.contains(session_id);
        Ok(self.session(session_id, script.prior_total_pages, completed))
    }

    async fn select_voice(&self, session_id: &SessionId, voice: Voice) -> PortResult<Session> {
        self.record(format!("select_voice:{}:{}", session_id, voice));
        let script = self.script();
        if !script.select_voice_delay.is_zero() {
            tokio::time::sleep(script.select_voice_delay).await;
        }
        let attempt = self.select_voice_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= script.select_voice_failures {
            return Err(PortError::Status {
                status: 503,
                message: "voice service unavailable".to_string(),
            });
        }
        let mut session = self.session(session_id, 3, false);
        session.voice = Some(voice);
        Ok(session)
    }

    async fn end(&self, session_id: &SessionId) -> PortResult<Session> {
        self.record(format!("end:{}", session_id));
        if self.script().end_fails {
            return Err(PortError::Transport("connection reset".to_string()));
        }
        Ok(self.session(session_id, 3, true))
    }

    async fn discard(&self, session_id: &SessionId) -> PortResult<()> {
        self.record(format!("discard:{}", session_id));
        let script = self.script();
        if !script.discard_delay.is_zero() {
            tokio::time::sleep(script.discard_delay).await;
        }
        if script.discard_fails {
            return Err(PortError::Status {
                status: 500,
                message: "could not delete".to_string(),
            });
        }
        Ok(())
    }

    async fn reload_page(&self, session_id: &SessionId, page_index: usize) -> PortResult<Page> {
        self.record(format!("reload_page:{}:{}", session_id, page_index));
        self.script()
            .reload_pages
            .into_iter()
            .find(|p| p.index == page_index)
            .ok_or_else(|| PortError::NotFound(format!("page {}", page_index)))
    }

    async fn reload_all(&self, session_id: &SessionId) -> PortResult<Vec<Page>> {
        self.record(format!("reload_all:{}", session_id));
        Ok(self.script().reload_pages)
    }

    async fn stats(&self, session_id: &SessionId) -> PortResult<SessionStats> {
        self.record(format!("stats:{}", session_id));
        let script = self.script();
        let attempt = self.stats_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= script.stats_failures {
            return Err(PortError::MissingBody("stats not aggregated yet".to_string()));
        }
        Ok(script.stats)
    }

    async fn pick_words(&self, session_id: &SessionId) -> PortResult<Vec<LearnedWord>> {
        self.record(format!("pick_words:{}", session_id));
        let script = self.script();
        if script.words_fail {
            return Err(PortError::Status {
                status: 500,
                message: "word picker crashed".to_string(),
            });
        }
        Ok(script.words)
    }
}

#[async_trait]
impl PageRepository for FakeBackend {
    async fn image(&self, session_id: &SessionId, page_index: usize) -> PortResult<PageImage> {
        self.record(format!("image:{}:{}", session_id, page_index));
        Ok(PageImage {
            url: format!("https://cdn.example/{}/{}.jpg", session_id, page_index),
        })
    }

    async fn ocr(&self, session_id: &SessionId, page_index: usize) -> PortResult<PageContent> {
        self.record(format!("ocr:{}:{}", session_id, page_index));
        Ok(PageContent {
            ocr_text: format!("Page {} text", page_index),
            translated_text: format!("페이지 {}", page_index),
        })
    }

    async fn tts(&self, session_id: &SessionId, page_index: usize) -> PortResult<PageAudio> {
        self.record(format!("tts:{}:{}", session_id, page_index));
        Ok(PageAudio {
            clips: vec![format!("https://cdn.example/{}/{}.mp3", session_id, page_index)],
        })
    }
}

#[async_trait]
impl ProcessRepository for FakeBackend {
    async fn upload_image(
        &self,
        session_id: &SessionId,
        page_index: usize,
        _image: &EncodedImage,
    ) -> PortResult<()> {
        self.record(format!("upload_image:{}:{}", session_id, page_index));
        self.ocr_polls.store(0, Ordering::SeqCst);
        self.tts_polls.store(0, Ordering::SeqCst);
        Ok(())
    }

    async fn upload_cover(&self, session_id: &SessionId, _image: &EncodedImage) -> PortResult<()> {
        self.record(format!("upload_cover:{}", session_id));
        self.ocr_polls.store(0, Ordering::SeqCst);
        self.tts_polls.store(0, Ordering::SeqCst);
        Ok(())
    }

    async fn ocr_status(
        &self,
        session_id: &SessionId,
        page_index: usize,
    ) -> PortResult<StageStatus> {
        self.record(format!("ocr_status:{}:{}", session_id, page_index));
        let errors = self.ocr_errors.fetch_add(1, Ordering::SeqCst) + 1;
        if errors <= self.script().ocr_failures {
            return Err(PortError::Status {
                status: 503,
                message: "ocr worker busy".to_string(),
            });
        }
        let polls = self.ocr_polls.fetch_add(1, Ordering::SeqCst) + 1;
        if polls >= self.script().ocr_ready_after {
            Ok(StageStatus::Ready)
        } else {
            Ok(StageStatus::Pending)
        }
    }

    async fn tts_status(
        &self,
        session_id: &SessionId,
        page_index: usize,
    ) -> PortResult<StageStatus> {
        self.record(format!("tts_status:{}:{}", session_id, page_index));
        let script = self.script();
        if script.tts_fails {
            return Ok(StageStatus::Failed);
        }
        let polls = self.tts_polls.fetch_add(1, Ordering::SeqCst) + 1;
        if polls >= script.tts_ready_after {
            Ok(StageStatus::Ready)
        } else {
            Ok(StageStatus::Pending)
        }
    }
}

#[derive(Default)]
pub struct MemorySettings {
    inner: Mutex<AppSettings>,
}

impl MemorySettings {
    pub fn with(settings: AppSettings) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(settings),
        })
    }
}

impl SettingsStore for MemorySettings {
    fn load(&self) -> AppSettings {
        self.inner.lock().unwrap().clone()
    }

    fn set_language(&self, language: &Language) -> PortResult<()> {
        self.inner.lock().unwrap().language = Some(language.clone());
        Ok(())
    }

    fn set_voice(&self, voice: Voice) -> PortResult<()> {
        self.inner.lock().unwrap().voice = Some(voice);
        Ok(())
    }

    fn set_device_id(&self, device_id: &str) -> PortResult<()> {
        self.inner.lock().unwrap().device_id = Some(device_id.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingPreview {
    pub played: Mutex<Vec<Voice>>,
}

impl VoicePreview for RecordingPreview {
    fn play(&self, voice: Voice) {
        self.played.lock().unwrap().push(voice);
    }
}

pub fn fast_config() -> Config {
    let mut config = Config::for_base_url("http://backend.invalid");
    config.poll_interval = Duration::from_millis(1);
    config.poll_max_attempts = 5;
    config.stats_delay = Duration::from_millis(1);
    config
}

pub struct Harness {
    pub ctx: Arc<AppContext>,
    pub backend: Arc<FakeBackend>,
    pub settings: Arc<MemorySettings>,
    pub preview: Arc<RecordingPreview>,
}

pub fn harness_with(script: Script, settings: AppSettings, config: Config) -> Harness {
    harness_with_overrides(script, settings, config, &[])
}

/// Like `harness_with`, but with some call sites handled under a different failure policy.
pub fn harness_with_overrides(
    script: Script,
    settings: AppSettings,
    config: Config,
    overrides: &[(CallSite, FailurePolicy)],
) -> Harness {
    let policies = overrides
        .iter()
        .fold(config.policy_table(), |table, (site, policy)| {
            table.with_policy(*site, *policy)
        });
    let backend = FakeBackend::new(script);
    let settings = MemorySettings::with(settings);
    let preview = Arc::new(RecordingPreview::default());
    let ctx = Arc::new(AppContext {
        users: backend.clone(),
        sessions: backend.clone(),
        pages: backend.clone(),
        process: backend.clone(),
        settings: settings.clone(),
        preview: preview.clone(),
        policies,
        config: Arc::new(config),
    });
    Harness {
        ctx,
        backend,
        settings,
        preview,
    }
}

pub fn harness(script: Script) -> Harness {
    harness_with(script, AppSettings::default(), fast_config())
}

pub fn harness_overriding(script: Script, overrides: &[(CallSite, FailurePolicy)]) -> Harness {
    harness_with_overrides(script, AppSettings::default(), fast_config(), overrides)
}

pub fn tiny_image() -> EncodedImage {
    EncodedImage {
        base64: "/9j/4AAQSkZJRg==".to_string(),
        width: 4,
        height: 3,
    }
}
