//! Error types for the HaoZhu client.

use crate::errors::RetryableError;
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

#[cfg(feature = "tracing")]
use tracing::warn;

/// Failure kinds reported by the HaoZhu service.
///
/// The service does not return structured error codes, so the kind is
/// derived from the wording of its `msg` field by [`HaozhuErrorKind::classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HaozhuErrorKind {
    /// Bad credentials, invalid or expired token.
    Authentication,
    /// Any other failure.
    Api,
    /// Request rate limited. The classifier never produces this kind.
    RateLimit,
    /// No number matches the request, or the requested number is taken.
    PhoneNotAvailable,
    /// The SMS has not arrived yet. Callers should poll again.
    MessageNotReady,
    /// Not enough balance to pay for the request.
    InsufficientBalance,
}

/// Keywords checked against the server message, in priority order.
const TOKEN_KEYWORD: &str = "token";
const AUTH_KEYWORDS: &[&str] = &["登录", "密码"];
const BALANCE_KEYWORDS: &[&str] = &["余额", "扣费"];
const PHONE_KEYWORD: &str = "号码";
const PHONE_SHORTAGE_KEYWORDS: &[&str] = &["无", "没有", "不足"];
const WAITING_KEYWORD: &str = "等待";
const SMS_KEYWORD: &str = "短信";
const SMS_ABSENT_KEYWORDS: &[&str] = &["无", "没有"];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

impl HaozhuErrorKind {
    /// Map a server failure message to an error kind.
    ///
    /// Rules are checked in a fixed order and the first match wins:
    /// authentication, balance, phone shortage, message not ready, then the
    /// generic [`HaozhuErrorKind::Api`] fallback.
    pub fn classify(msg: &str) -> Self {
        if msg.to_lowercase().contains(TOKEN_KEYWORD) || contains_any(msg, AUTH_KEYWORDS) {
            Self::Authentication
        } else if contains_any(msg, BALANCE_KEYWORDS) {
            Self::InsufficientBalance
        } else if msg.contains(PHONE_KEYWORD) && contains_any(msg, PHONE_SHORTAGE_KEYWORDS) {
            Self::PhoneNotAvailable
        } else if msg.contains(WAITING_KEYWORD)
            || (msg.contains(SMS_KEYWORD) && contains_any(msg, SMS_ABSENT_KEYWORDS))
        {
            Self::MessageNotReady
        } else {
            Self::Api
        }
    }

    /// Returns the stable name of this kind.
    pub fn code_name(&self) -> &'static str {
        match self {
            Self::Authentication => "AUTHENTICATION",
            Self::Api => "API",
            Self::RateLimit => "RATE_LIMIT",
            Self::PhoneNotAvailable => "PHONE_NOT_AVAILABLE",
            Self::MessageNotReady => "MESSAGE_NOT_READY",
            Self::InsufficientBalance => "INSUFFICIENT_BALANCE",
        }
    }

    /// Returns human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Authentication => "Authentication failed",
            Self::Api => "API call failed",
            Self::RateLimit => "Request rate limited",
            Self::PhoneNotAvailable => "Phone number not available",
            Self::MessageNotReady => "Message not received yet",
            Self::InsufficientBalance => "Insufficient balance",
        }
    }

    /// Returns true if issuing the same operation later might succeed.
    pub fn should_retry_operation(&self) -> bool {
        matches!(
            self,
            Self::MessageNotReady | Self::PhoneNotAvailable | Self::RateLimit
        )
    }
}

impl Display for HaozhuErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code_name())
    }
}

/// Error reported by the HaoZhu service, or raised by the client on its
/// behalf before a request is made.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct HaozhuServiceError {
    /// Classified kind.
    pub kind: HaozhuErrorKind,
    /// Message, prefixed with the operation label when one was given.
    pub message: String,
    /// Original `code` field from the response. `None` for client-side errors.
    pub code: Option<String>,
}

impl HaozhuServiceError {
    /// Create a new service error.
    pub fn new(kind: HaozhuErrorKind, message: impl Into<String>, code: Option<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code,
        }
    }

    /// Create an error that did not come from a server response.
    pub fn client(kind: HaozhuErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, message, None)
    }
}

/// Classify a failed response into a service error.
///
/// `context` labels the operation; the message becomes `"{context}: {msg}"`
/// when it is non-empty.
pub(crate) fn classify_response(code: &str, msg: &str, context: &str) -> HaozhuServiceError {
    let kind = HaozhuErrorKind::classify(msg);
    let message = if context.is_empty() {
        msg.to_string()
    } else {
        format!("{}: {}", context, msg)
    };
    let error = HaozhuServiceError::new(kind, message, Some(code.to_string()));

    #[cfg(feature = "tracing")]
    warn!(
        kind = %error.kind,
        code = %code,
        message = %error.message,
        "HaoZhu service returned error"
    );

    error
}

/// Main error type for HaoZhu client operations.
#[derive(Debug, Error)]
pub enum HaozhuError {
    /// Failed to build HTTP client.
    #[error("Failed to build HTTP client: {0}")]
    BuildHttpClient(#[source] reqwest::Error),

    /// Server URL cannot be parsed.
    #[error("Invalid server URL '{url}': {source}")]
    InvalidServerUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Error building the request query string.
    #[error("Error building HaoZhu request URL: {0}")]
    BuildRequestUrl(#[source] serde_urlencoded::ser::Error),

    /// Failed to send HTTP request (connection error, timeout).
    #[error("Failed to send HTTP request: {0}")]
    HttpRequest(#[from] reqwest_middleware::Error),

    /// Server answered with a non-success HTTP status.
    #[error("HTTP status error: {0}")]
    HttpStatus(#[source] reqwest::Error),

    /// Failed to read the response body.
    #[error("Failed to read response: {0}")]
    ParseResponse(#[source] reqwest::Error),

    /// Response body is not the expected JSON.
    #[error("Failed to deserialize JSON response: {0}")]
    DeserializeJson(#[source] serde_json::Error),

    /// HaoZhu service error.
    #[error("HaoZhu service error: {0}")]
    Service(#[source] HaozhuServiceError),

    /// No message arrived within the polling budget.
    #[error("No message for phone {phone} after {polls} polls")]
    MessageTimeout { phone: String, polls: u32 },
}

pub type Result<T> = std::result::Result<T, HaozhuError>;

impl HaozhuError {
    /// Kind of the service error, if this is one.
    pub fn kind(&self) -> Option<HaozhuErrorKind> {
        match self {
            HaozhuError::Service(error) => Some(error.kind),
            _ => None,
        }
    }

    /// Returns true if the message has not arrived yet.
    pub fn is_message_not_ready(&self) -> bool {
        self.kind() == Some(HaozhuErrorKind::MessageNotReady)
    }

    /// Returns true if this is an authentication failure.
    pub fn is_authentication(&self) -> bool {
        self.kind() == Some(HaozhuErrorKind::Authentication)
    }

    /// Server `code` of the service error, if any.
    pub fn server_code(&self) -> Option<&str> {
        match self {
            HaozhuError::Service(error) => error.code.as_deref(),
            _ => None,
        }
    }
}

impl RetryableError for HaozhuError {
    fn is_retryable(&self) -> bool {
        match self {
            // Transport failures
            HaozhuError::HttpRequest(_)
            | HaozhuError::HttpStatus(_)
            | HaozhuError::ParseResponse(_) => true,
            // The service answered; sending the same request again won't help
            HaozhuError::Service(_)
            | HaozhuError::DeserializeJson(_)
            | HaozhuError::BuildHttpClient(_)
            | HaozhuError::InvalidServerUrl { .. }
            | HaozhuError::BuildRequestUrl(_)
            | HaozhuError::MessageTimeout { .. } => false,
        }
    }

    fn should_retry_operation(&self) -> bool {
        match self {
            HaozhuError::Service(error) => error.kind.should_retry_operation(),
            HaozhuError::HttpRequest(_)
            | HaozhuError::HttpStatus(_)
            | HaozhuError::ParseResponse(_)
            | HaozhuError::MessageTimeout { .. } => true,
            HaozhuError::DeserializeJson(_)
            | HaozhuError::BuildHttpClient(_)
            | HaozhuError::InvalidServerUrl { .. }
            | HaozhuError::BuildRequestUrl(_) => false,
        }
    }
}
