use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{GmailCredentials, SmtpSettings};
use crate::types::{EmailError, EmailMessage};

/// A single delivery channel for transactional email.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// Attempts one delivery, returning the provider message id.
    async fn send_email(&self, message: &EmailMessage) -> Result<String, EmailError>;
}

/// SMTP delivery through lettre (Gmail or a generic relay).
pub struct SmtpEmailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpEmailTransport {
    /// Builds a transport for Gmail's submission endpoint.
    pub fn gmail(
        credentials: &GmailCredentials,
        from_address: &str,
        timeout: Duration,
    ) -> Result<Self, EmailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay("smtp.gmail.com")
            .map_err(|e| EmailError::Smtp(e.to_string()))?
            .credentials(Credentials::new(
                credentials.user.clone(),
                credentials.password.clone(),
            ))
            .timeout(Some(timeout))
            .build();

        Ok(Self {
            transport,
            from_address: from_address.to_string(),
        })
    }

    /// Builds a transport for a generic STARTTLS relay.
    pub fn relay(
        settings: &SmtpSettings,
        from_address: &str,
        timeout: Duration,
    ) -> Result<Self, EmailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| EmailError::Smtp(e.to_string()))?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.user.clone(),
                settings.password.clone(),
            ))
            .timeout(Some(timeout))
            .build();

        Ok(Self {
            transport,
            from_address: from_address.to_string(),
        })
    }
}

#[async_trait]
impl EmailTransport for SmtpEmailTransport {
    async fn send_email(&self, message: &EmailMessage) -> Result<String, EmailError> {
        let message_id = format!("<{}@plan-a>", Uuid::new_v4());
        let email = build_message(&self.from_address, message, &message_id)?;

        debug!("Submitting {} to SMTP relay", message_id);
        match self.transport.send(email).await {
            Ok(response) => {
                info!(
                    "SMTP accepted {} with code {}",
                    message_id,
                    response.code()
                );
                Ok(message_id)
            }
            Err(e) => Err(classify_smtp_error(e)),
        }
    }
}

fn build_message(
    from: &str,
    message: &EmailMessage,
    message_id: &str,
) -> Result<Message, EmailError> {
    let from_mailbox: Mailbox = from
        .parse()
        .map_err(|e| EmailError::InvalidMessage(format!("invalid from address: {}", e)))?;
    let to_mailbox: Mailbox = message
        .to
        .parse()
        .map_err(|e| EmailError::InvalidMessage(format!("invalid recipient: {}", e)))?;

    let builder = Message::builder()
        .from(from_mailbox)
        .to(to_mailbox)
        .subject(message.subject.clone())
        .message_id(Some(message_id.to_string()));

    let email = match &message.text_body {
        Some(text) => builder.multipart(MultiPart::alternative_plain_html(
            text.clone(),
            message.html_body.clone(),
        )),
        None => builder
            .header(ContentType::TEXT_HTML)
            .body(message.html_body.clone()),
    };

    email.map_err(|e| EmailError::InvalidMessage(e.to_string()))
}

fn classify_smtp_error(err: lettre::transport::smtp::Error) -> EmailError {
    if is_transient_smtp_error(&err) {
        EmailError::TransientNetwork(err.to_string())
    } else {
        EmailError::Smtp(err.to_string())
    }
}

/// Walks the source chain looking for socket-level failures. Everything else
/// (auth rejections, permanent SMTP replies) is treated as fatal.
fn is_transient_smtp_error(err: &lettre::transport::smtp::Error) -> bool {
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        if let Some(io_err) = inner.downcast_ref::<std::io::Error>() {
            return is_transient_io_kind(io_err.kind()) || is_dns_failure(&io_err.to_string());
        }
        source = inner.source();
    }
    is_dns_failure(&err.to_string())
}

pub(crate) fn is_transient_io_kind(kind: std::io::ErrorKind) -> bool {
    use std::io::ErrorKind::*;

    matches!(
        kind,
        TimedOut
            | ConnectionRefused
            | ConnectionReset
            | ConnectionAborted
            | NotConnected
            | BrokenPipe
            | HostUnreachable
            | NetworkUnreachable
            | NetworkDown
    )
}

/// DNS failures surface as uncategorized io errors; match on the resolver's
/// message instead of the kind.
pub(crate) fn is_dns_failure(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("lookup") || message.contains("dns") || message.contains("resolve")
}

/// Delivery through the Resend HTTP API.
pub struct ResendEmailTransport {
    client: reqwest::Client,
    api_key: String,
    from_address: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ResendResponse {
    id: String,
}

impl ResendEmailTransport {
    /// Builds an API transport with the given key and request timeout.
    pub fn new(api_key: &str, from_address: &str, timeout: Duration) -> Result<Self, EmailError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmailError::Api(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            from_address: from_address.to_string(),
            base_url: "https://api.resend.com".to_string(),
        })
    }
}

#[async_trait]
impl EmailTransport for ResendEmailTransport {
    async fn send_email(&self, message: &EmailMessage) -> Result<String, EmailError> {
        let payload = ResendRequest {
            from: &self.from_address,
            to: [message.to.as_str()],
            subject: &message.subject,
            html: &message.html_body,
            text: message.text_body.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    EmailError::TransientNetwork(e.to_string())
                } else {
                    EmailError::Api(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Api(format!("HTTP {}: {}", status, body)));
        }

        let parsed: ResendResponse = response
            .json()
            .await
            .map_err(|e| EmailError::Api(format!("failed to parse response: {}", e)))?;

        info!("Resend accepted message {}", parsed.id);
        Ok(parsed.id)
    }
}

/// Mock transport for development and tests: logs the message and fabricates
/// an id without touching the network.
pub struct MockEmailTransport;

#[async_trait]
impl EmailTransport for MockEmailTransport {
    async fn send_email(&self, message: &EmailMessage) -> Result<String, EmailError> {
        info!("📧 [MOCK EMAIL] To: {}", message.to);
        info!("📧 [MOCK EMAIL] Subject: {}", message.subject);
        info!("📧 [MOCK EMAIL] Body:\n{}", message.html_body);

        Ok(format!("mock-email-{}", Uuid::new_v4()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn socket_level_failures_are_transient() {
        for kind in [
            ErrorKind::TimedOut,
            ErrorKind::ConnectionRefused,
            ErrorKind::ConnectionReset,
            ErrorKind::ConnectionAborted,
            ErrorKind::NotConnected,
            ErrorKind::BrokenPipe,
            ErrorKind::HostUnreachable,
            ErrorKind::NetworkUnreachable,
            ErrorKind::NetworkDown,
        ] {
            assert!(is_transient_io_kind(kind), "{:?} should retry", kind);
        }
    }

    #[test]
    fn non_network_failures_are_fatal() {
        for kind in [
            ErrorKind::PermissionDenied,
            ErrorKind::InvalidData,
            ErrorKind::InvalidInput,
            ErrorKind::Other,
        ] {
            assert!(!is_transient_io_kind(kind), "{:?} should not retry", kind);
        }
    }

    #[test]
    fn resolver_messages_count_as_transient() {
        assert!(is_dns_failure(
            "failed to lookup address information: Name or service not known"
        ));
        assert!(is_dns_failure("DNS error: no records found"));
        assert!(!is_dns_failure("535 authentication credentials invalid"));
    }

    #[test]
    fn builds_multipart_when_text_alternative_present() {
        let message = EmailMessage {
            to: "traveler@example.com".to_string(),
            subject: "Your booking".to_string(),
            html_body: "<p>Confirmed</p>".to_string(),
            text_body: Some("Confirmed".to_string()),
        };

        let built = build_message(
            "Plan A <no-reply@planabariloche.com>",
            &message,
            "<test@plan-a>",
        );
        assert!(built.is_ok());
    }

    #[test]
    fn rejects_malformed_recipient() {
        let message = EmailMessage {
            to: "not an address".to_string(),
            subject: "Your booking".to_string(),
            html_body: "<p>Confirmed</p>".to_string(),
            text_body: None,
        };

        let built = build_message(
            "Plan A <no-reply@planabariloche.com>",
            &message,
            "<test@plan-a>",
        );
        assert!(matches!(built, Err(EmailError::InvalidMessage(_))));
    }
}
