//! services/client/src/repository/pages.rs
//!
//! Implements the `PageRepository` port: per-page image, OCR and TTS artifacts.

use crate::repository::protocol::{self, ImageResponse, OcrResponse, TtsResponse};
use crate::repository::rest::{require, RestClient};
use async_trait::async_trait;
use reqwest::Method;
use storybook_core::{PageAudio, PageContent, PageImage, PageRepository, PortResult, SessionId};

#[derive(Clone)]
pub struct HttpPageRepository {
    client: RestClient,
}

impl HttpPageRepository {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageRepository for HttpPageRepository {
    async fn image(&self, session_id: &SessionId, page_index: usize) -> PortResult<PageImage> {
        require(session_id.as_str(), "session id")?;
        let response: ImageResponse = self
            .client
            .call(
                self.client
                    .request(Method::GET, &protocol::page_path(session_id, page_index, "image")),
            )
            .await?;
        Ok(response.into_domain())
    }

    async fn ocr(&self, session_id: &SessionId, page_index: usize) -> PortResult<PageContent> {
        require(session_id.as_str(), "session id")?;
        let response: OcrResponse = self
            .client
            .call(
                self.client
                    .request(Method::GET, &protocol::page_path(session_id, page_index, "ocr")),
            )
            .await?;
        Ok(response.into_domain())
    }

    async fn tts(&self, session_id: &SessionId, page_index: usize) -> PortResult<PageAudio> {
        require(session_id.as_str(), "session id")?;
        let response: TtsResponse = self
            .client
            .call(
                self.client
                    .request(Method::GET, &protocol::page_path(session_id, page_index, "tts")),
            )
            .await?;
        Ok(response.into_domain())
    }
}
