//! services/client/src/repository/sessions.rs
//!
//! Implements the `SessionRepository` port over the backend REST API.

use crate::repository::protocol::{
    self, AckResponse, PageResponse, PagesResponse, SelectVoiceRequest, SessionResponse,
    StartSessionRequest, StatsResponse, WordsResponse,
};
use crate::repository::rest::{require, RestClient};
use async_trait::async_trait;
use reqwest::Method;
use storybook_core::{
    LearnedWord, Page, PortError, PortResult, Session, SessionId, SessionRepository,
    SessionStats, UserId, Voice,
};
use tracing::info;

#[derive(Clone)]
pub struct HttpSessionRepository {
    client: RestClient,
}

impl HttpSessionRepository {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SessionRepository for HttpSessionRepository {
    async fn start(&self, user_id: &UserId, total_pages: usize) -> PortResult<Session> {
        require(user_id.as_str(), "user id")?;
        if total_pages == 0 {
            return Err(PortError::Precondition(
                "a session needs at least one page".to_string(),
            ));
        }
        let body = StartSessionRequest {
            user_id: user_id.to_string(),
            total_pages,
        };
        let response: SessionResponse = self
            .client
            .call(self.client.request(Method::POST, &protocol::SESSIONS).json(&body))
            .await?;
        info!(session_id = %response.session_id, total_pages, "Session started");
        Ok(response.into_domain())
    }

    async fn select_voice(&self, session_id: &SessionId, voice: Voice) -> PortResult<Session> {
        require(session_id.as_str(), "session id")?;
        let body = SelectVoiceRequest {
            voice: voice.as_str().to_string(),
        };
        let response: SessionResponse = self
            .client
            .call(
                self.client
                    .request(Method::POST, &protocol::session_action_path(session_id, "voice"))
                    .json(&body),
            )
            .await?;
        Ok(response.into_domain())
    }

    async fn get(&self, session_id: &SessionId) -> PortResult<Session> {
        require(session_id.as_str(), "session id")?;
        let response: SessionResponse = self
            .client
            .call(self.client.request(Method::GET, &protocol::session_path(session_id)))
            .await?;
        Ok(response.into_domain())
    }

    async fn end(&self, session_id: &SessionId) -> PortResult<Session> {
        require(session_id.as_str(), "session id")?;
        let response: SessionResponse = self
            .client
            .call(
                self.client
                    .request(Method::POST, &protocol::session_action_path(session_id, "end")),
            )
            .await?;
        Ok(response.into_domain())
    }

    async fn discard(&self, session_id: &SessionId) -> PortResult<()> {
        require(session_id.as_str(), "session id")?;
        let ack: AckResponse = self
            .client
            .call(
                self.client
                    .request(Method::DELETE, &protocol::session_path(session_id)),
            )
            .await?;
        if !ack.success {
            return Err(PortError::Unexpected(
                ack.message
                    .unwrap_or_else(|| format!("session {} was not discarded", session_id)),
            ));
        }
        info!(session_id = %session_id, "Session discarded");
        Ok(())
    }

    async fn reload_page(&self, session_id: &SessionId, page_index: usize) -> PortResult<Page> {
        require(session_id.as_str(), "session id")?;
        let response: PageResponse = self
            .client
            .call(self.client.request(
                Method::GET,
                &protocol::session_page_reload_path(session_id, page_index),
            ))
            .await?;
        Ok(response.into_domain())
    }

    async fn reload_all(&self, session_id: &SessionId) -> PortResult<Vec<Page>> {
        require(session_id.as_str(), "session id")?;
        let response: PagesResponse = self
            .client
            .call(self.client.request(
                Method::GET,
                &protocol::session_action_path(session_id, "pages/reload"),
            ))
            .await?;
        Ok(response
            .pages
            .into_iter()
            .map(PageResponse::into_domain)
            .collect())
    }

    async fn stats(&self, session_id: &SessionId) -> PortResult<SessionStats> {
        require(session_id.as_str(), "session id")?;
        let response: StatsResponse = self
            .client
            .call(
                self.client
                    .request(Method::GET, &protocol::session_action_path(session_id, "stats")),
            )
            .await?;
        Ok(response.into_domain())
    }

    async fn pick_words(&self, session_id: &SessionId) -> PortResult<Vec<LearnedWord>> {
        require(session_id.as_str(), "session id")?;
        let response: WordsResponse = self
            .client
            .call(
                self.client
                    .request(Method::GET, &protocol::session_action_path(session_id, "words")),
            )
            .await?;
        Ok(response.into_domain())
    }
}
