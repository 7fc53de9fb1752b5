//! services/client/src/repository/process.rs
//!
//! Implements the `ProcessRepository` port: image uploads and the OCR/TTS
//! status endpoints polled after each capture.

use crate::repository::protocol::{self, AckResponse, StatusResponse, UploadRequest};
use crate::repository::rest::{require, RestClient};
use async_trait::async_trait;
use reqwest::Method;
use storybook_core::{
    EncodedImage, PortError, PortResult, ProcessRepository, SessionId, StageStatus,
};
use tracing::debug;

#[derive(Clone)]
pub struct HttpProcessRepository {
    client: RestClient,
}

impl HttpProcessRepository {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    async fn upload(&self, path: &[&str], body: UploadRequest) -> PortResult<()> {
        require(&body.image_base64, "image payload")?;
        let ack: AckResponse = self
            .client
            .call(self.client.request(Method::POST, path).json(&body))
            .await?;
        if !ack.success {
            return Err(PortError::Unexpected(
                ack.message
                    .unwrap_or_else(|| "the backend rejected the upload".to_string()),
            ));
        }
        Ok(())
    }

    async fn status(
        &self,
        session_id: &SessionId,
        page_index: usize,
        stage: &str,
    ) -> PortResult<StageStatus> {
        require(session_id.as_str(), "session id")?;
        let response: StatusResponse = self
            .client
            .call(self.client.request(
                Method::GET,
                &protocol::process_status_path(session_id, page_index, stage),
            ))
            .await?;
        let status = response.into_domain();
        debug!(session_id = %session_id, page_index, stage, ?status, "Stage status");
        Ok(status)
    }
}

#[async_trait]
impl ProcessRepository for HttpProcessRepository {
    async fn upload_image(
        &self,
        session_id: &SessionId,
        page_index: usize,
        image: &EncodedImage,
    ) -> PortResult<()> {
        require(session_id.as_str(), "session id")?;
        self.upload(
            &protocol::PROCESS_UPLOAD,
            UploadRequest::page(session_id, page_index, image),
        )
        .await
    }

    async fn upload_cover(&self, session_id: &SessionId, image: &EncodedImage) -> PortResult<()> {
        require(session_id.as_str(), "session id")?;
        self.upload(&protocol::PROCESS_COVER, UploadRequest::cover(session_id, image))
            .await
    }

    async fn ocr_status(
        &self,
        session_id: &SessionId,
        page_index: usize,
    ) -> PortResult<StageStatus> {
        self.status(session_id, page_index, "ocr").await
    }

    async fn tts_status(
        &self,
        session_id: &SessionId,
        page_index: usize,
    ) -> PortResult<StageStatus> {
        self.status(session_id, page_index, "tts").await
    }
}
