//! services/client/src/viewmodel/capture.rs
//!
//! Per-page capture loop: upload the photo, then poll OCR and TTS readiness.

use crate::adapters::encode_page_file;
use crate::error::ClientError;
use crate::viewmodel::state::{AppContext, ScreenScope};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use storybook_core::{CallSite, EncodedImage, FailurePolicy, PortResult, SessionId, StageStatus};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOutcome {
    pub page_index: usize,
    pub ocr: StageStatus,
    pub tts: StageStatus,
    pub attempts: u32,
}

impl CaptureOutcome {
    pub fn is_ready(&self) -> bool {
        self.ocr == StageStatus::Ready && self.tts == StageStatus::Ready
    }

    pub fn has_failed(&self) -> bool {
        self.ocr == StageStatus::Failed || self.tts == StageStatus::Failed
    }
}

pub struct CaptureViewModel {
    ctx: Arc<AppContext>,
    scope: ScreenScope,
    session_id: SessionId,
}

impl CaptureViewModel {
    pub fn new(ctx: Arc<AppContext>, session_id: SessionId) -> Self {
        Self {
            ctx,
            scope: ScreenScope::new(),
            session_id,
        }
    }

    pub fn scope(&self) -> &ScreenScope {
        &self.scope
    }

    pub async fn capture_file(
        &self,
        page_index: usize,
        path: &Path,
    ) -> Result<CaptureOutcome, ClientError> {
        let image = encode_page_file(path).await?;
        self.capture(page_index, &image).await
    }

    /// Uploads the page (page 0 is the cover) and waits until it is processed.
    pub async fn capture(
        &self,
        page_index: usize,
        image: &EncodedImage,
    ) -> Result<CaptureOutcome, ClientError> {
        let process = &self.ctx.process;
        let upload = async {
            if page_index == 0 {
                process.upload_cover(&self.session_id, image).await
            } else {
                process
                    .upload_image(&self.session_id, page_index, image)
                    .await
            }
        };
        self.scope.run(upload).await??;
        info!(session_id = %self.session_id, page_index, "Page uploaded");

        self.wait_until_ready(page_index).await
    }

    /// Polls both stages with a fixed delay until they are ready, one fails, or
    /// the attempt budget runs out.
    pub async fn wait_until_ready(&self, page_index: usize) -> Result<CaptureOutcome, ClientError> {
        let interval = self.ctx.config.poll_interval;
        let max_attempts = self.ctx.config.poll_max_attempts.max(1);
        let process = &self.ctx.process;

        let mut outcome = CaptureOutcome {
            page_index,
            ocr: StageStatus::Pending,
            tts: StageStatus::Pending,
            attempts: 0,
        };

        while outcome.attempts < max_attempts {
            outcome.attempts += 1;

            if outcome.ocr != StageStatus::Ready {
                outcome.ocr = self
                    .poll_stage(page_index, "ocr", process.ocr_status(&self.session_id, page_index))
                    .await?;
            }
            if outcome.tts != StageStatus::Ready {
                outcome.tts = self
                    .poll_stage(page_index, "tts", process.tts_status(&self.session_id, page_index))
                    .await?;
            }

            if outcome.is_ready() {
                info!(session_id = %self.session_id, page_index, attempts = outcome.attempts, "Page ready");
                return Ok(outcome);
            }
            if outcome.has_failed() {
                warn!(session_id = %self.session_id, page_index, ocr = ?outcome.ocr, tts = ?outcome.tts, "Page processing failed");
                return Ok(outcome);
            }
            if outcome.attempts < max_attempts {
                self.scope.sleep(interval).await?;
            }
        }

        warn!(session_id = %self.session_id, page_index, attempts = outcome.attempts, "Gave up waiting for page processing");
        Ok(outcome)
    }

    /// A failed status call counts as a pending attempt while polling blocks until success.
    async fn poll_stage(
        &self,
        page_index: usize,
        stage: &str,
        poll: impl Future<Output = PortResult<StageStatus>>,
    ) -> Result<StageStatus, ClientError> {
        match self.scope.run(poll).await? {
            Ok(status) => Ok(status),
            Err(e) if self.ctx.policy(CallSite::PollStatus) == FailurePolicy::BlockUntilSuccess => {
                warn!(session_id = %self.session_id, page_index, stage, "Status poll failed, still waiting: {}", e);
                Ok(StageStatus::Pending)
            }
            Err(e) => Err(e.into()),
        }
    }
}
