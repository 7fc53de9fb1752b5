//! services/client/src/viewmodel/session_start.rs
//!
//! Starts a new reading session while keeping at most one active session per user.

use crate::viewmodel::state::AppContext;
use std::sync::Arc;
use storybook_core::{Page, PortError, PortResult, Session, SessionId, User};
use tracing::{info, warn};

/// How to resolve a session that is still active when a new one is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorSessionResolution {
    Resume,
    End,
    Discard,
}

#[derive(Debug, Clone)]
pub enum StartOutcome {
    Started(Session),
    Resumed {
        session_id: SessionId,
        total_pages: usize,
        pages: Vec<Page>,
        page_index: usize,
    },
}

/// A session the backend still considers open for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    pub id: SessionId,
    /// Declared page count, when the backend could be asked.
    pub total_pages: Option<usize>,
}

pub struct SessionStartViewModel {
    ctx: Arc<AppContext>,
}

impl SessionStartViewModel {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }

    /// The user's most recent session, if the backend has not ended it yet.
    ///
    /// A session whose state cannot be read is treated as still active.
    pub async fn active_session(&self, user: &User) -> Option<ActiveSession> {
        let reference = match self.ctx.users.info(&user.id).await {
            Ok(fresh) => fresh.current_session,
            Err(e) => {
                warn!(user_id = %user.id, "Could not refresh user info: {}", e);
                user.current_session.clone()
            }
        }?;

        match self.ctx.sessions.get(&reference).await {
            Ok(session) if session.is_active() => Some(ActiveSession {
                id: session.id,
                total_pages: Some(session.total_pages),
            }),
            Ok(_) => {
                info!(session_id = %reference, "Most recent session is already ended");
                None
            }
            Err(e) if e.is_not_found() => {
                info!(session_id = %reference, "Most recent session no longer exists");
                None
            }
            Err(e) => {
                warn!(session_id = %reference, "Could not read session state, treating it as active: {}", e);
                Some(ActiveSession {
                    id: reference,
                    total_pages: None,
                })
            }
        }
    }

    pub async fn start(
        &self,
        user: &User,
        total_pages: usize,
        resolution: Option<PriorSessionResolution>,
    ) -> PortResult<StartOutcome> {
        if let Some(prior) = self.active_session(user).await {
            match resolution {
                None => {
                    return Err(PortError::Precondition(format!(
                        "session {} is still active; resume, end or discard it first",
                        prior.id
                    )))
                }
                Some(PriorSessionResolution::Resume) => {
                    let declared = prior.total_pages.unwrap_or(total_pages);
                    return self.resume(prior.id, declared).await;
                }
                Some(PriorSessionResolution::End) => {
                    self.ctx.sessions.end(&prior.id).await?;
                    info!(session_id = %prior.id, "Ended prior session");
                }
                Some(PriorSessionResolution::Discard) => {
                    self.ctx.sessions.discard(&prior.id).await?;
                    info!(session_id = %prior.id, "Discarded prior session");
                }
            }
        }

        let session = self.ctx.sessions.start(&user.id, total_pages).await?;
        Ok(StartOutcome::Started(session))
    }

    /// Reloads every uploaded page of `session_id` and picks the first one that
    /// is not ready yet, or the last uploaded page when all of them are.
    pub async fn resume(
        &self,
        session_id: SessionId,
        total_pages: usize,
    ) -> PortResult<StartOutcome> {
        let mut pages = self.ctx.sessions.reload_all(&session_id).await?;
        pages.sort_by_key(|p| p.index);

        let page_index = pages
            .iter()
            .find(|p| !p.is_ready())
            .or_else(|| pages.last())
            .map(|p| p.index)
            .ok_or_else(|| {
                PortError::Precondition(format!("session {} has no pages to resume", session_id))
            })?;
        let uploaded = pages.last().map_or(0, |p| p.index + 1);
        let total_pages = total_pages.max(uploaded);
        info!(session_id = %session_id, page_index, total_pages, "Resuming session");

        Ok(StartOutcome::Resumed {
            session_id,
            total_pages,
            pages,
            page_index,
        })
    }
}
