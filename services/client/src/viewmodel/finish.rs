//! services/client/src/viewmodel/finish.rs
//!
//! The finish screen: end the session, fetch the reading statistics and the
//! learned-word summary, then reveal the words once every balloon is popped.

use crate::error::ClientError;
use crate::viewmodel::state::{AppContext, ScreenScope};
use std::sync::Arc;
use storybook_core::{
    CallSite, FailurePolicy, LearnedWord, PortResult, SessionId, SessionStats,
};
use tokio::sync::watch;
use tracing::{error, info, warn};

pub const DEFAULT_BALLOONS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct FinishSummary {
    /// `None` when stats could not be fetched; that failure is only logged.
    pub stats: Option<SessionStats>,
    pub words: Vec<LearnedWord>,
}

impl FinishSummary {
    /// Pages read, excluding the cover.
    pub fn pages_read(&self) -> Option<u32> {
        self.stats.as_ref().map(SessionStats::pages_read)
    }
}

/// Counts popped balloons; the learned-words panel shows once all are popped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalloonBoard {
    total: usize,
    popped: usize,
}

impl BalloonBoard {
    pub fn new(total: usize) -> Self {
        Self { total, popped: 0 }
    }

    /// Pops one balloon and reports whether the panel is now revealed.
    pub fn pop(&mut self) -> bool {
        if self.popped < self.total {
            self.popped += 1;
        }
        self.words_revealed()
    }

    pub fn remaining(&self) -> usize {
        self.total - self.popped
    }

    pub fn words_revealed(&self) -> bool {
        self.popped >= self.total
    }
}

pub struct FinishViewModel {
    ctx: Arc<AppContext>,
    scope: ScreenScope,
    session_id: SessionId,
    summary: watch::Sender<Option<FinishSummary>>,
}

impl FinishViewModel {
    pub fn new(ctx: Arc<AppContext>, session_id: SessionId) -> Self {
        Self {
            ctx,
            scope: ScreenScope::new(),
            session_id,
            summary: watch::channel(None).0,
        }
    }

    pub fn scope(&self) -> &ScreenScope {
        &self.scope
    }

    pub fn summary(&self) -> watch::Receiver<Option<FinishSummary>> {
        self.summary.subscribe()
    }

    pub fn balloons(&self) -> BalloonBoard {
        BalloonBoard::new(DEFAULT_BALLOONS)
    }

    /// Completes only once both the stats branch and the word-pick branch have arrived.
    pub async fn run(&self) -> Result<FinishSummary, ClientError> {
        let (stats, words) = tokio::join!(self.end_then_stats(), self.pick_words());
        let summary = FinishSummary {
            stats: stats?,
            words: words?,
        };
        info!(
            session_id = %self.session_id,
            pages_read = ?summary.pages_read(),
            words = summary.words.len(),
            "Finish screen ready"
        );
        self.summary.send_replace(Some(summary.clone()));
        Ok(summary)
    }

    async fn end_then_stats(&self) -> Result<Option<SessionStats>, ClientError> {
        let policies = self.ctx.policies();

        if let Err(e) = self.scope.run(self.ctx.sessions.end(&self.session_id)).await? {
            if !policies.for_call(CallSite::EndSession).continues_after_failure() {
                return Err(e.into());
            }
            warn!(session_id = %self.session_id, "Ending session failed: {}", e);
        }

        // Give the backend time to aggregate before asking for stats.
        self.scope.sleep(policies.stats_delay()).await?;

        let policy = policies.for_call(CallSite::SessionStats);
        let first = self.fetch_stats().await?;
        let result = match (first, policy) {
            (Ok(stats), _) => Ok(stats),
            (Err(e), FailurePolicy::RetryOnceAfter(delay)) => {
                warn!(session_id = %self.session_id, "Stats fetch failed, retrying once: {}", e);
                self.scope.sleep(delay).await?;
                self.fetch_stats().await?
            }
            (Err(e), _) => Err(e),
        };

        match result {
            Ok(stats) => Ok(Some(stats)),
            Err(e)
                if matches!(policy, FailurePolicy::RetryOnceAfter(_))
                    || policy.continues_after_failure() =>
            {
                error!(session_id = %self.session_id, "Could not load session stats: {}", e);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn fetch_stats(&self) -> Result<PortResult<SessionStats>, ClientError> {
        self.scope.run(self.ctx.sessions.stats(&self.session_id)).await
    }

    async fn pick_words(&self) -> Result<Vec<LearnedWord>, ClientError> {
        match self.scope.run(self.ctx.sessions.pick_words(&self.session_id)).await? {
            Ok(words) => Ok(words),
            Err(e) if self.ctx.policy(CallSite::PickWords).continues_after_failure() => {
                warn!(session_id = %self.session_id, "Word pick failed, showing no words: {}", e);
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_revealed_after_last_pop() {
        let mut board = BalloonBoard::new(3);
        assert!(!board.pop());
        assert!(!board.pop());
        assert_eq!(board.remaining(), 1);
        assert!(board.pop());
        assert!(board.pop());
        assert_eq!(board.remaining(), 0);
    }

    #[test]
    fn empty_board_is_revealed_immediately() {
        assert!(BalloonBoard::new(0).words_revealed());
    }

    #[test]
    fn summary_pages_read_excludes_cover() {
        let summary = FinishSummary {
            stats: Some(SessionStats {
                total_pages: 5,
                total_words_read: 80,
                total_time_spent: 600,
            }),
            words: Vec::new(),
        };
        assert_eq!(summary.pages_read(), Some(4));
    }
}
