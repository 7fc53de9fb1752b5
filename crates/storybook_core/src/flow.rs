//! crates/storybook_core/src/flow.rs
//!
//! The screen-to-screen progression of a reading session. The flow is a pure
//! state machine: view models report what happened, the flow decides which
//! screen comes next.

use crate::domain::SessionId;

//=========================================================================================
// Screens and Events
//=========================================================================================

/// The screen the user is currently on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    NoUser,
    Authenticating,
    LanguageSelect,
    Main,
    SessionStart,
    Capturing { page_index: usize },
    VoiceSelect,
    ContentInstruction,
    Reading { page_index: usize },
    Finish,
    DecideSave,
    Discarding,
}

impl Screen {
    /// Screens that belong to an in-progress session and may be cancelled.
    pub fn is_mid_session(&self) -> bool {
        matches!(
            self,
            Screen::SessionStart
                | Screen::Capturing { .. }
                | Screen::VoiceSelect
                | Screen::ContentInstruction
                | Screen::Reading { .. }
                | Screen::Finish
                | Screen::DecideSave
        )
    }
}

/// Something that happened on the current screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    AppStarted,
    Authenticated { language_known: bool },
    LanguageChangeRequested,
    LanguageChosen,
    StartRequested,
    Resumed {
        session_id: SessionId,
        total_pages: usize,
        page_index: usize,
    },
    SessionStarted {
        session_id: SessionId,
        total_pages: usize,
    },
    PageCaptured,
    VoiceConfirmed,
    InstructionAcknowledged,
    NextPage,
    FinishRequested,
    FinishCompleted { save_prompt: bool },
    SaveDecided,
    CancelRequested,
    DiscardResolved,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("Event {event:?} is not valid on screen {screen:?}")]
    InvalidTransition { screen: Screen, event: FlowEvent },
    #[error("A session must have at least one page, got {0}")]
    EmptySession(usize),
    #[error("Page index {page_index} is outside a session of {total_pages} pages")]
    PageOutOfRange { page_index: usize, total_pages: usize },
}

//=========================================================================================
// Flow
//=========================================================================================

/// Tracks the current screen and the session it belongs to.
#[derive(Debug, Clone)]
pub struct Flow {
    screen: Screen,
    session_id: Option<SessionId>,
    total_pages: usize,
}

impl Default for Flow {
    fn default() -> Self {
        Self::new()
    }
}

impl Flow {
    pub fn new() -> Self {
        Self {
            screen: Screen::NoUser,
            session_id: None,
            total_pages: 0,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Applies an event and returns the new screen.
    ///
    /// Invalid events are rejected and leave the flow untouched.
    pub fn apply(&mut self, event: FlowEvent) -> Result<Screen, FlowError> {
        let next = self.next_screen(&event)?;

        match &event {
            FlowEvent::SessionStarted {
                session_id,
                total_pages,
            }
            | FlowEvent::Resumed {
                session_id,
                total_pages,
                ..
            } => {
                self.session_id = Some(session_id.clone());
                self.total_pages = *total_pages;
            }
            _ => {}
        }
        if next == Screen::Main {
            self.session_id = None;
            self.total_pages = 0;
        }

        self.screen = next.clone();
        Ok(next)
    }

    fn next_screen(&self, event: &FlowEvent) -> Result<Screen, FlowError> {
        let last_page = self.total_pages.saturating_sub(1);

        let next = match (&self.screen, event) {
            (Screen::NoUser, FlowEvent::AppStarted) => Screen::Authenticating,
            (Screen::Authenticating, FlowEvent::Authenticated { language_known }) => {
                if *language_known {
                    Screen::Main
                } else {
                    Screen::LanguageSelect
                }
            }
            (Screen::LanguageSelect, FlowEvent::LanguageChosen) => Screen::Main,
            (Screen::Main, FlowEvent::LanguageChangeRequested) => Screen::LanguageSelect,
            (Screen::Main, FlowEvent::StartRequested) => Screen::SessionStart,
            (
                Screen::Main | Screen::SessionStart,
                FlowEvent::Resumed {
                    total_pages,
                    page_index,
                    ..
                },
            ) => {
                if *total_pages == 0 {
                    return Err(FlowError::EmptySession(0));
                }
                if *page_index >= *total_pages {
                    return Err(FlowError::PageOutOfRange {
                        page_index: *page_index,
                        total_pages: *total_pages,
                    });
                }
                Screen::Reading {
                    page_index: *page_index,
                }
            }
            (Screen::SessionStart, FlowEvent::SessionStarted { total_pages, .. }) => {
                if *total_pages == 0 {
                    return Err(FlowError::EmptySession(0));
                }
                Screen::Capturing { page_index: 0 }
            }
            (Screen::Capturing { page_index }, FlowEvent::PageCaptured) => {
                if *page_index == 0 {
                    // The cover is followed by voice selection, even for one-page sessions.
                    Screen::VoiceSelect
                } else if *page_index >= last_page {
                    Screen::Finish
                } else {
                    Screen::Reading {
                        page_index: *page_index,
                    }
                }
            }
            (Screen::VoiceSelect, FlowEvent::VoiceConfirmed) => Screen::ContentInstruction,
            (Screen::ContentInstruction, FlowEvent::InstructionAcknowledged) => {
                if self.total_pages <= 1 {
                    Screen::Finish
                } else {
                    Screen::Capturing { page_index: 1 }
                }
            }
            (Screen::Reading { page_index }, FlowEvent::NextPage) => {
                if *page_index >= last_page {
                    Screen::Finish
                } else {
                    Screen::Capturing {
                        page_index: page_index + 1,
                    }
                }
            }
            (Screen::Reading { .. }, FlowEvent::FinishRequested) => Screen::Finish,
            (Screen::Finish, FlowEvent::FinishCompleted { save_prompt }) => {
                if *save_prompt {
                    Screen::DecideSave
                } else {
                    Screen::Main
                }
            }
            (Screen::DecideSave, FlowEvent::SaveDecided) => Screen::Main,
            (screen, FlowEvent::CancelRequested) if screen.is_mid_session() => Screen::Discarding,
            (Screen::Discarding, FlowEvent::DiscardResolved) => Screen::Main,
            (screen, event) => {
                return Err(FlowError::InvalidTransition {
                    screen: screen.clone(),
                    event: event.clone(),
                })
            }
        };

        Ok(next)
    }
}
