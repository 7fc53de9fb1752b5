pub mod domain;
pub mod flow;
pub mod policy;
pub mod ports;

pub use domain::{
    AppSettings, EncodedImage, Language, LearnedWord, Page, PageAudio, PageContent, PageImage,
    Session, SessionId, SessionStats, StageStatus, User, UserId, Voice,
};
pub use flow::{Flow, FlowError, FlowEvent, Screen};
pub use policy::{AuthPolicy, CallSite, FailurePolicy, PolicyTable};
pub use ports::{
    PageRepository, PortError, PortResult, ProcessRepository, SessionRepository, SettingsStore,
    UserRepository, VoicePreview,
};
