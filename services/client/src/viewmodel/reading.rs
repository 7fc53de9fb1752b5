//! services/client/src/viewmodel/reading.rs

use crate::error::ClientError;
use crate::viewmodel::state::{AppContext, ScreenScope};
use futures::future::try_join3;
use std::sync::Arc;
use storybook_core::{Page, PageAudio, PageContent, PageImage, SessionId};
use tracing::debug;

/// Everything the reading screen shows for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub page_index: usize,
    pub image: PageImage,
    pub content: PageContent,
    pub audio: PageAudio,
}

pub struct ReadingViewModel {
    ctx: Arc<AppContext>,
    scope: ScreenScope,
    session_id: SessionId,
}

impl ReadingViewModel {
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

    /// Fetches image, OCR/translation and TTS for a page concurrently.
    pub async fn load(&self, page_index: usize) -> Result<PageView, ClientError> {
        let pages = &self.ctx.pages;
        let (image, content, audio) = self
            .scope
            .run(try_join3(
                pages.image(&self.session_id, page_index),
                pages.ocr(&self.session_id, page_index),
                pages.tts(&self.session_id, page_index),
            ))
            .await??;
        debug!(session_id = %self.session_id, page_index, clips = audio.clips.len(), "Page loaded");

        Ok(PageView {
            page_index,
            image,
            content,
            audio,
        })
    }

    pub async fn reload_page(&self, page_index: usize) -> Result<Page, ClientError> {
        Ok(self
            .scope
            .run(self.ctx.sessions.reload_page(&self.session_id, page_index))
            .await??)
    }

    pub async fn reload_all(&self) -> Result<Vec<Page>, ClientError> {
        Ok(self
            .scope
            .run(self.ctx.sessions.reload_all(&self.session_id))
            .await??)
    }
}
