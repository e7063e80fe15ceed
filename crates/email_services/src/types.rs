use serde::Serialize;

/// Errors raised by a single delivery channel.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// Network-level failure that may succeed on a later attempt
    /// (DNS resolution, connection refused/reset, timeout, unreachable host).
    #[error("transient network error: {0}")]
    TransientNetwork(String),

    /// SMTP rejection or protocol failure that will not recover on retry.
    #[error("SMTP error: {0}")]
    Smtp(String),

    /// Hosted email API failure.
    #[error("email API error: {0}")]
    Api(String),

    /// The message itself could not be built (bad address, malformed content).
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

impl EmailError {
    /// Whether the retry loop may attempt this send again.
    pub fn is_transient(&self) -> bool {
        matches!(self, EmailError::TransientNetwork(_))
    }
}

/// An outbound transactional email.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// HTML body
    pub html_body: String,
    /// Optional plain-text alternative
    pub text_body: Option<String>,
}

/// The delivery channel that handled (or would handle) a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailProvider {
    /// Direct Gmail SMTP using account credentials
    GmailSmtp,
    /// Generic SMTP relay
    Smtp,
    /// Hosted transactional email API (Resend)
    ResendApi,
    /// No-op simulation
    Simulated,
}

impl EmailProvider {
    /// Stable label used in logs and diagnostics responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailProvider::GmailSmtp => "gmail_smtp",
            EmailProvider::Smtp => "smtp",
            EmailProvider::ResendApi => "resend_api",
            EmailProvider::Simulated => "simulated",
        }
    }
}

/// Result of a send. The chain never hard-fails: when every channel is
/// exhausted the outcome is a simulated success carrying the causing error.
#[derive(Debug, Clone, Serialize)]
pub struct EmailOutcome {
    /// Provider message id, or a `sim-<millis>` pseudo-identifier
    pub message_id: String,
    /// Channel that produced this outcome
    pub provider: EmailProvider,
    /// True when no real delivery happened
    pub simulated: bool,
    /// Delivery attempts made across all channels
    pub attempts: u32,
    /// Error that forced the simulation, when any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
