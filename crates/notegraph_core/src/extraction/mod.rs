//! External extraction service boundary.
//!
//! # Responsibility
//! - Define the request shape sent to the extraction model.
//! - Define the `ExtractionService` seam so the orchestrator can run against
//!   the HTTP client or an in-process fake.
//!
//! # Invariants
//! - Services return raw model text; parsing happens in `plan::analyze`.
//! - No retries happen behind this trait.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod chat_completions;

pub use chat_completions::ChatCompletionsService;

const ERROR_BODY_MAX_CHARS: usize = 200;

/// Chat role for one instruction message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
}

impl ChatRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
        }
    }
}

/// One instruction message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Fully rendered instruction for one extraction call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    pub messages: Vec<ChatMessage>,
}

/// Failures of the outbound extraction call.
#[derive(Debug)]
pub enum ExtractionError {
    /// No API key is configured.
    MissingCredentials { env: &'static str },
    /// Connection, timeout or body read failure.
    Transport(reqwest::Error),
    /// Service answered with a non-success status.
    Status { code: u16, body: String },
    /// Service answered without any message content.
    EmptyResponse,
    /// Service answer could not be decoded.
    MalformedResponse(String),
}

impl ExtractionError {
    pub(crate) fn status(code: u16, body: &str) -> Self {
        Self::Status {
            code,
            body: body.chars().take(ERROR_BODY_MAX_CHARS).collect(),
        }
    }
}

impl Display for ExtractionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredentials { env } => {
                write!(f, "extraction service credentials missing (set {env})")
            }
            Self::Transport(err) => write!(f, "extraction service unavailable: {err}"),
            Self::Status { code, body } => {
                write!(f, "extraction service returned HTTP {code}: {body}")
            }
            Self::EmptyResponse => write!(f, "extraction service returned no content"),
            Self::MalformedResponse(details) => {
                write!(f, "extraction service response is malformed: {details}")
            }
        }
    }
}

impl Error for ExtractionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ExtractionError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value)
    }
}

/// Outbound natural-language extraction call.
pub trait ExtractionService {
    /// Submits `request` and returns the raw model output text.
    fn complete(&self, request: &ExtractionRequest) -> Result<String, ExtractionError>;
}

impl<S: ExtractionService + ?Sized> ExtractionService for &S {
    fn complete(&self, request: &ExtractionRequest) -> Result<String, ExtractionError> {
        (**self).complete(request)
    }
}

impl<S: ExtractionService + ?Sized> ExtractionService for Box<S> {
    fn complete(&self, request: &ExtractionRequest) -> Result<String, ExtractionError> {
        (**self).complete(request)
    }
}
