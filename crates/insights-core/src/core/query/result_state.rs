//! Loading/success/failure state for one view's data, with
//! last-dispatched-wins settlement.
//!
//! Every fetch is tagged with the [`RequestId`] handed out by
//! [`ResultMachine::begin`]. Only the most recently issued id may settle;
//! anything older is superseded and dropped without touching state.

use crate::api::models::ErrorDetails;
use crate::error::ApiError;
use tokio::sync::watch;

/// Monotonic tag for one dispatched fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing dispatched yet
    #[default]
    Idle,
    Loading,
    Success,
    Failure,
}

/// Coarse classification used by front ends to pick a reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No response: network failure or timeout
    Transport,
    /// 401/403
    SessionExpired,
    /// 422 with structured details
    Validation,
    /// Any other non-success status
    Server,
    /// Response arrived but could not be read
    Decode,
}

/// User-facing description of a failed fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    pub kind: FailureKind,
    pub status: Option<u16>,
    pub message: String,
    pub details: Option<ErrorDetails>,
}

impl FetchFailure {
    /// Convert a client error into a stable message about loading `subject`.
    pub fn from_api_error(error: &ApiError, subject: &str) -> Self {
        let status = error.status();
        match error {
            ApiError::Network { .. } | ApiError::Timeout { .. } => Self {
                kind: FailureKind::Transport,
                status,
                message: format!("Failed to load {}. Please try again.", subject),
                details: None,
            },
            ApiError::Unauthorized { .. } => Self {
                kind: FailureKind::SessionExpired,
                status,
                message: "Session expired. Please log in again.".to_string(),
                details: None,
            },
            ApiError::Validation {
                message, details, ..
            } => Self {
                kind: FailureKind::Validation,
                status,
                message: format!("Validation error: {}", message),
                details: details.clone(),
            },
            ApiError::Http { message, .. } => Self {
                kind: FailureKind::Server,
                status,
                message: format!("Failed to load {}: {}", subject, message),
                details: None,
            },
            ApiError::Decode { .. } => Self {
                kind: FailureKind::Decode,
                status,
                message: format!("Failed to load {}: unexpected response.", subject),
                details: None,
            },
        }
    }

    pub fn is_session_expired(&self) -> bool {
        self.kind == FailureKind::SessionExpired
    }
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Snapshot published to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultState<T> {
    pub phase: Phase,
    /// Last successful payload; kept across loading and failure
    pub data: Option<T>,
    /// True strictly between dispatch and settlement of the latest request
    pub is_loading: bool,
    /// User-facing message of the latest failure, cleared on dispatch
    pub error: Option<String>,
    pub failure: Option<FetchFailure>,
}

impl<T> Default for ResultState<T> {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            data: None,
            is_loading: false,
            error: None,
            failure: None,
        }
    }
}

/// What happened to a settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Applied,
    /// A newer request was dispatched in the meantime
    Discarded,
}

/// Owns the result state and its broadcast channel.
#[derive(Debug)]
pub struct ResultMachine<T> {
    latest: u64,
    state: watch::Sender<ResultState<T>>,
}

impl<T: Clone> Default for ResultMachine<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> ResultMachine<T> {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ResultState::default());
        Self { latest: 0, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<ResultState<T>> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ResultState<T> {
        self.state.borrow().clone()
    }

    pub fn latest(&self) -> Option<RequestId> {
        (self.latest > 0).then_some(RequestId(self.latest))
    }

    /// Enter Loading for a new request and return its id.
    pub fn begin(&mut self) -> RequestId {
        self.latest = self.latest.wrapping_add(1);
        let id = RequestId(self.latest);
        self.state.send_modify(|state| {
            state.phase = Phase::Loading;
            state.is_loading = true;
            state.error = None;
            state.failure = None;
        });
        log::debug!("Request {} dispatched", id);
        id
    }

    /// Apply the outcome of request `id` unless it has been superseded.
    pub fn settle(&mut self, id: RequestId, result: Result<T, FetchFailure>) -> Settlement {
        if id.0 != self.latest {
            log::debug!(
                "Discarding request {} (latest is #{})",
                id,
                self.latest
            );
            return Settlement::Discarded;
        }

        match result {
            Ok(data) => {
                self.state.send_modify(|state| {
                    state.phase = Phase::Success;
                    state.data = Some(data);
                    state.is_loading = false;
                    state.error = None;
                    state.failure = None;
                });
            }
            Err(failure) => {
                log::warn!("Request {} failed: {}", id, failure.message);
                self.state.send_modify(|state| {
                    state.phase = Phase::Failure;
                    state.is_loading = false;
                    state.error = Some(failure.message.clone());
                    state.failure = Some(failure);
                });
            }
        }
        Settlement::Applied
    }
}
