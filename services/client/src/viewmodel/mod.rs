pub mod auth;
pub mod capture;
pub mod decide_save;
pub mod discard;
pub mod finish;
pub mod language;
pub mod orchestrator;
pub mod reading;
pub mod session_start;
pub mod state;
pub mod voice;

// Re-export the per-screen view models so the binary and tests can reach them
// without spelling out every module path.
pub use auth::{AuthOutcome, AuthViewModel};
pub use capture::{CaptureOutcome, CaptureViewModel};
pub use decide_save::{DecideOutcome, DecideSaveViewModel, SaveChoice};
pub use discard::{DiscardDialog, DiscardOutcome};
pub use finish::{BalloonBoard, FinishSummary, FinishViewModel};
pub use language::LanguageViewModel;
pub use orchestrator::{PageSource, RunPlan, RunReport, SessionOrchestrator};
pub use reading::{PageView, ReadingViewModel};
pub use session_start::{PriorSessionResolution, SessionStartViewModel, StartOutcome};
pub use state::{AppContext, InFlight, ScreenScope};
pub use voice::{SelectOutcome, VoiceSelectViewModel};
