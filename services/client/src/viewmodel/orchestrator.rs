//! services/client/src/viewmodel/orchestrator.rs
//!
//! Drives one complete run of the session flow through the view models:
//! authenticate, pick a language, start a session, capture and read every
//! page, finish, and decide whether to keep the session.

use crate::error::ClientError;
use crate::viewmodel::{
    auth::AuthViewModel,
    capture::{CaptureOutcome, CaptureViewModel},
    decide_save::{DecideOutcome, DecideSaveViewModel, SaveChoice},
    discard::{DiscardDialog, DiscardOutcome},
    finish::{FinishSummary, FinishViewModel},
    language::LanguageViewModel,
    reading::{PageView, ReadingViewModel},
    session_start::{PriorSessionResolution, SessionStartViewModel, StartOutcome},
    state::AppContext,
    voice::{SelectOutcome, VoiceSelectViewModel},
};
use std::path::PathBuf;
use std::sync::Arc;
use storybook_core::{
    EncodedImage, Flow, FlowEvent, Language, Screen, SessionId, User, Voice,
};
use tracing::{error, info, warn};

/// Where a page photo comes from.
#[derive(Debug, Clone)]
pub enum PageSource {
    File(PathBuf),
    Encoded(EncodedImage),
}

/// The user's choices for one run, as the screens would collect them.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub device_id: Option<String>,
    pub language: Option<Language>,
    pub voice: Voice,
    /// The first page is the cover.
    pub pages: Vec<PageSource>,
    pub resolution: Option<PriorSessionResolution>,
    pub choice: SaveChoice,
    /// Cancel (and discard) the session when a mid-session step fails.
    pub discard_on_error: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub screens: Vec<Screen>,
    pub user: Option<User>,
    pub session_id: Option<SessionId>,
    pub pages: Vec<PageView>,
    pub summary: Option<FinishSummary>,
    pub decision: Option<DecideOutcome>,
    /// Pages whose processing was still pending when polling gave up.
    pub unready_pages: Vec<usize>,
}

pub struct SessionOrchestrator {
    ctx: Arc<AppContext>,
    flow: Flow,
    report: RunReport,
    /// A resumed page that was uploaded but not processed yet.
    awaiting: Option<usize>,
}

impl SessionOrchestrator {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self {
            ctx,
            flow: Flow::new(),
            report: RunReport::default(),
            awaiting: None,
        }
    }

    pub fn screen(&self) -> &Screen {
        self.flow.screen()
    }

    fn advance(&mut self, event: FlowEvent) -> Result<Screen, ClientError> {
        let screen = self.flow.apply(event)?;
        info!(screen = ?screen, "Screen changed");
        self.report.screens.push(screen.clone());
        Ok(screen)
    }

    pub async fn run(mut self, plan: RunPlan) -> Result<RunReport, ClientError> {
        let user = self.sign_in(&plan).await?;

        if plan.pages.is_empty() {
            return Err(ClientError::Rejected(
                "at least one page (the cover) is required".to_string(),
            ));
        }

        self.advance(FlowEvent::StartRequested)?;
        let start = SessionStartViewModel::new(self.ctx.clone())
            .start(&user, plan.pages.len(), plan.resolution)
            .await;
        match start {
            Ok(StartOutcome::Started(session)) => {
                self.report.session_id = Some(session.id.clone());
                self.advance(FlowEvent::SessionStarted {
                    session_id: session.id,
                    total_pages: plan.pages.len(),
                })?;
            }
            Ok(StartOutcome::Resumed {
                session_id,
                total_pages,
                pages,
                page_index,
            }) => {
                self.report.session_id = Some(session_id.clone());
                let ready = pages
                    .iter()
                    .any(|p| p.index == page_index && p.is_ready());
                if !ready {
                    self.awaiting = Some(page_index);
                }
                self.advance(FlowEvent::Resumed {
                    session_id,
                    total_pages,
                    page_index,
                })?;
            }
            Err(e) => {
                error!("Could not start a session: {}", e);
                return Err(e.into());
            }
        }

        match self.walk_session(&plan).await {
            Ok(()) => Ok(self.report),
            Err(e) if plan.discard_on_error && self.flow.screen().is_mid_session() => {
                error!("Session step failed, discarding: {}", e);
                self.cancel().await?;
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    async fn sign_in(&mut self, plan: &RunPlan) -> Result<User, ClientError> {
        self.advance(FlowEvent::AppStarted)?;

        let auth = AuthViewModel::new(self.ctx.clone());
        let device_id = match &plan.device_id {
            Some(id) => id.clone(),
            None => auth.device_id()?,
        };
        let outcome = auth.authenticate(&device_id).await?;
        let screen = self.advance(FlowEvent::Authenticated {
            language_known: outcome.language_known,
        })?;

        let language_vm = LanguageViewModel::new(self.ctx.clone());
        let user_id = outcome.user.as_ref().map(|u| u.id.clone());
        let mut user = outcome.user;

        let wanted = match (&screen, &plan.language) {
            (Screen::LanguageSelect, chosen) => {
                Some(chosen.clone().unwrap_or_else(|| language_vm.current()))
            }
            (_, Some(chosen)) if *chosen != language_vm.current() => {
                self.advance(FlowEvent::LanguageChangeRequested)?;
                Some(chosen.clone())
            }
            _ => None,
        };
        if let Some(language) = wanted {
            if let Some(updated) = language_vm.choose(user_id.as_ref(), &language).await? {
                user = Some(updated);
            }
            self.advance(FlowEvent::LanguageChosen)?;
        }

        let user = user.ok_or_else(|| {
            ClientError::Rejected("no user account is available to start a session".to_string())
        })?;
        self.report.user = Some(user.clone());
        Ok(user)
    }

    async fn walk_session(&mut self, plan: &RunPlan) -> Result<(), ClientError> {
        let session_id = self
            .flow
            .session_id()
            .cloned()
            .ok_or_else(|| ClientError::Internal("no active session".to_string()))?;

        loop {
            match self.flow.screen().clone() {
                Screen::Capturing { page_index } => {
                    let capture = CaptureViewModel::new(self.ctx.clone(), session_id.clone());
                    let outcome = match plan.pages.get(page_index) {
                        Some(PageSource::File(path)) => capture.capture_file(page_index, path).await?,
                        Some(PageSource::Encoded(image)) => capture.capture(page_index, image).await?,
                        None => {
                            return Err(ClientError::Rejected(format!(
                                "no photo for page {}",
                                page_index
                            )))
                        }
                    };
                    self.settle(outcome)?;
                    self.advance(FlowEvent::PageCaptured)?;
                }
                Screen::VoiceSelect => {
                    let voice = VoiceSelectViewModel::new(self.ctx.clone(), session_id.clone());
                    match voice.select(plan.voice).await {
                        SelectOutcome::Confirmed(_) => {}
                        SelectOutcome::Failed(_) if voice.is_next_enabled() => {}
                        SelectOutcome::Failed(message) => return Err(ClientError::Rejected(message)),
                        SelectOutcome::Cancelled => return Err(ClientError::Cancelled),
                        SelectOutcome::Ignored => {
                            return Err(ClientError::Internal(
                                "voice selection already in flight".to_string(),
                            ))
                        }
                    }
                    self.advance(FlowEvent::VoiceConfirmed)?;
                }
                Screen::ContentInstruction => {
                    self.advance(FlowEvent::InstructionAcknowledged)?;
                }
                Screen::Reading { page_index } => {
                    if self.awaiting == Some(page_index) {
                        self.awaiting = None;
                        let capture = CaptureViewModel::new(self.ctx.clone(), session_id.clone());
                        let outcome = capture.wait_until_ready(page_index).await?;
                        self.settle(outcome)?;
                    }

                    let reading = ReadingViewModel::new(self.ctx.clone(), session_id.clone());
                    match reading.load(page_index).await {
                        Ok(view) => self.report.pages.push(view),
                        Err(e)
                            if self.report.unready_pages.contains(&page_index)
                                && !matches!(e, ClientError::Cancelled) =>
                        {
                            warn!(page_index, "Skipping unprocessed page: {}", e);
                        }
                        Err(e) => return Err(e),
                    }
                    self.advance(FlowEvent::NextPage)?;
                }
                Screen::Finish => {
                    let finish = FinishViewModel::new(self.ctx.clone(), session_id.clone());
                    let summary = finish.run().await?;
                    let mut balloons = finish.balloons();
                    while !balloons.pop() {}
                    self.report.summary = Some(summary);
                    self.advance(FlowEvent::FinishCompleted { save_prompt: true })?;
                }
                Screen::DecideSave => {
                    let decide = DecideSaveViewModel::new(self.ctx.clone(), session_id.clone());
                    let decision = decide.decide(plan.choice).await;
                    if let DecideOutcome::Failed(message) = &decision {
                        return Err(ClientError::Rejected(message.clone()));
                    }
                    self.report.decision = Some(decision);
                    self.advance(FlowEvent::SaveDecided)?;
                }
                Screen::Main => return Ok(()),
                other => {
                    return Err(ClientError::Internal(format!(
                        "unexpected screen {:?} during a session",
                        other
                    )))
                }
            }
        }
    }

    /// A failed stage stops the run; a page still pending after the attempt
    /// budget is recorded and the flow moves on.
    fn settle(&mut self, outcome: CaptureOutcome) -> Result<(), ClientError> {
        if outcome.has_failed() {
            return Err(ClientError::PageFailed {
                page_index: outcome.page_index,
            });
        }
        if !outcome.is_ready() {
            warn!(
                page_index = outcome.page_index,
                attempts = outcome.attempts,
                "Page still processing, moving on"
            );
            self.report.unready_pages.push(outcome.page_index);
        }
        Ok(())
    }

    /// Cancels the current session through the discard confirmation dialog.
    pub async fn cancel(&mut self) -> Result<DiscardOutcome, ClientError> {
        let session_id = self
            .flow
            .session_id()
            .cloned()
            .ok_or_else(|| ClientError::Internal("no active session to cancel".to_string()))?;
        self.advance(FlowEvent::CancelRequested)?;

        let dialog = DiscardDialog::new(self.ctx.clone(), session_id);
        let outcome = dialog.confirm().await?.ok_or_else(|| {
            ClientError::Internal("discard confirmation already in flight".to_string())
        })?;
        if !outcome.discarded {
            warn!("{}", outcome.message);
        }
        self.advance(FlowEvent::DiscardResolved)?;
        Ok(outcome)
    }
}
