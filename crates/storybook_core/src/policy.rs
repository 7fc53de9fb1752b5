//! crates/storybook_core/src/policy.rs
//!
//! Per-call-site failure handling. Each repository call the view models issue
//! has its own tolerance; there is no central retry or backoff.

use crate::ports::PortError;
use std::collections::HashMap;
use std::time::Duration;

/// Every repository call a view model issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallSite {
    Login,
    Register,
    UpdateLanguage,
    StartSession,
    ResolvePriorSession,
    UploadImage,
    PollStatus,
    SelectVoice,
    LoadPage,
    EndSession,
    SessionStats,
    PickWords,
    DecideDiscard,
    ConfirmDiscard,
}

/// What a call site does when its call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Forward navigation stays blocked until the call succeeds.
    BlockUntilSuccess,
    /// The failure is logged and the flow continues.
    LogAndContinue,
    /// The call is retried exactly once after the delay; a second failure is logged.
    RetryOnceAfter(Duration),
    /// A transient message is shown; the user may re-invoke the same action.
    SurfaceAndAllowRetry,
    /// The failure is replaced by an empty/default value.
    DefaultOnFailure,
}

impl FailurePolicy {
    /// Whether the flow moves past a failed call without the user acting again.
    pub fn continues_after_failure(&self) -> bool {
        matches!(
            self,
            FailurePolicy::LogAndContinue | FailurePolicy::DefaultOnFailure
        )
    }
}

/// Decides whether a failed login should fall through to registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthPolicy {
    /// Any login failure triggers registration, and the flow proceeds whatever
    /// the registration outcome.
    #[default]
    RegisterOnAnyFailure,
    /// Only a "user not found" login failure triggers registration; other
    /// failures and failed registrations are reported.
    RegisterOnNotFound,
}

impl AuthPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "register_on_any_failure" | "any" => Some(AuthPolicy::RegisterOnAnyFailure),
            "register_on_not_found" | "not_found" => Some(AuthPolicy::RegisterOnNotFound),
            _ => None,
        }
    }

    pub fn should_register(&self, login_error: &PortError) -> bool {
        match self {
            AuthPolicy::RegisterOnAnyFailure => true,
            AuthPolicy::RegisterOnNotFound => login_error.is_not_found(),
        }
    }

    /// Whether the flow may proceed when registration itself failed.
    pub fn proceeds_after_failed_registration(&self) -> bool {
        matches!(self, AuthPolicy::RegisterOnAnyFailure)
    }
}

/// Maps call sites to their failure policy.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    stats_delay: Duration,
    overrides: HashMap<CallSite, FailurePolicy>,
}

impl PolicyTable {
    pub fn new(stats_delay: Duration) -> Self {
        Self {
            stats_delay,
            overrides: HashMap::new(),
        }
    }

    /// Replaces the policy of one call site.
    pub fn with_policy(mut self, site: CallSite, policy: FailurePolicy) -> Self {
        self.overrides.insert(site, policy);
        self
    }

    pub fn stats_delay(&self) -> Duration {
        self.stats_delay
    }

    pub fn for_call(&self, site: CallSite) -> FailurePolicy {
        if let Some(policy) = self.overrides.get(&site) {
            return *policy;
        }
        match site {
            CallSite::Login | CallSite::Register => FailurePolicy::LogAndContinue,
            CallSite::UpdateLanguage => FailurePolicy::SurfaceAndAllowRetry,
            CallSite::StartSession | CallSite::ResolvePriorSession => {
                FailurePolicy::SurfaceAndAllowRetry
            }
            CallSite::UploadImage | CallSite::PollStatus | CallSite::LoadPage => {
                FailurePolicy::BlockUntilSuccess
            }
            CallSite::SelectVoice => FailurePolicy::SurfaceAndAllowRetry,
            CallSite::EndSession => FailurePolicy::LogAndContinue,
            CallSite::SessionStats => FailurePolicy::RetryOnceAfter(self.stats_delay),
            CallSite::PickWords => FailurePolicy::DefaultOnFailure,
            CallSite::DecideDiscard => FailurePolicy::SurfaceAndAllowRetry,
            CallSite::ConfirmDiscard => FailurePolicy::LogAndContinue,
        }
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::new(Duration::from_millis(1500))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_stats_is_retried() {
        let table = PolicyTable::new(Duration::from_millis(10));
        let sites = [
            CallSite::Login,
            CallSite::Register,
            CallSite::UpdateLanguage,
            CallSite::StartSession,
            CallSite::ResolvePriorSession,
            CallSite::UploadImage,
            CallSite::PollStatus,
            CallSite::SelectVoice,
            CallSite::LoadPage,
            CallSite::EndSession,
            CallSite::SessionStats,
            CallSite::PickWords,
            CallSite::DecideDiscard,
            CallSite::ConfirmDiscard,
        ];
        let retried: Vec<_> = sites
            .iter()
            .filter(|site| matches!(table.for_call(**site), FailurePolicy::RetryOnceAfter(_)))
            .collect();
        assert_eq!(retried, vec![&CallSite::SessionStats]);
        assert_eq!(
            table.for_call(CallSite::SessionStats),
            FailurePolicy::RetryOnceAfter(Duration::from_millis(10))
        );
    }

    #[test]
    fn error_visibility_differs_per_call_site() {
        let table = PolicyTable::default();
        assert_eq!(
            table.for_call(CallSite::SelectVoice),
            FailurePolicy::SurfaceAndAllowRetry
        );
        assert_eq!(
            table.for_call(CallSite::PickWords),
            FailurePolicy::DefaultOnFailure
        );
        assert_eq!(
            table.for_call(CallSite::ConfirmDiscard),
            FailurePolicy::LogAndContinue
        );
    }

    #[test]
    fn override_replaces_one_call_site() {
        let table = PolicyTable::default()
            .with_policy(CallSite::PickWords, FailurePolicy::SurfaceAndAllowRetry);
        assert_eq!(
            table.for_call(CallSite::PickWords),
            FailurePolicy::SurfaceAndAllowRetry
        );
        assert_eq!(
            table.for_call(CallSite::ConfirmDiscard),
            FailurePolicy::LogAndContinue
        );
    }

    #[test]
    fn only_tolerant_policies_continue() {
        assert!(FailurePolicy::LogAndContinue.continues_after_failure());
        assert!(FailurePolicy::DefaultOnFailure.continues_after_failure());
        assert!(!FailurePolicy::BlockUntilSuccess.continues_after_failure());
        assert!(!FailurePolicy::SurfaceAndAllowRetry.continues_after_failure());
        assert!(!FailurePolicy::RetryOnceAfter(Duration::ZERO).continues_after_failure());
    }

    #[test]
    fn default_auth_policy_registers_on_any_failure() {
        let policy = AuthPolicy::default();
        assert!(policy.should_register(&PortError::Transport("timeout".into())));
        assert!(policy.proceeds_after_failed_registration());
    }

    #[test]
    fn not_found_policy_ignores_transient_failures() {
        let policy = AuthPolicy::RegisterOnNotFound;
        assert!(!policy.should_register(&PortError::Transport("timeout".into())));
        assert!(policy.should_register(&PortError::Status {
            status: 404,
            message: "unknown device".into(),
        }));
        assert!(!policy.proceeds_after_failed_registration());
    }

    #[test]
    fn parses_auth_policy_names() {
        assert_eq!(
            AuthPolicy::parse("register_on_not_found"),
            Some(AuthPolicy::RegisterOnNotFound)
        );
        assert_eq!(AuthPolicy::parse("bogus"), None);
    }
}
