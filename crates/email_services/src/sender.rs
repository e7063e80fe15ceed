use std::sync::Arc;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::EmailConfig;
use crate::transport::{EmailTransport, ResendEmailTransport, SmtpEmailTransport};
use crate::types::{EmailError, EmailMessage, EmailOutcome, EmailProvider};

/// The provider-fallback delivery chain.
///
/// Channel order: forced simulation short-circuits everything; otherwise the
/// first fully-configured provider wins (Gmail SMTP, generic SMTP, hosted
/// API). SMTP sends retry transient network failures with linear backoff and
/// fall through to the hosted API once exhausted. When no channel delivers,
/// the outcome is a simulated success carrying the causing error, so callers
/// never have to special-case total delivery failure.
#[derive(Clone)]
pub struct EmailSender {
    config: EmailConfig,
    smtp: Option<Arc<dyn EmailTransport>>,
    api: Option<Arc<dyn EmailTransport>>,
}

impl EmailSender {
    /// Builds the sender, constructing whichever transports the
    /// configuration allows. A transport that fails to construct is logged
    /// and left out; the chain degrades to the next channel.
    pub fn new(config: EmailConfig) -> Self {
        let timeout = config.policy.timeout;

        let smtp: Option<Arc<dyn EmailTransport>> = if let Some(gmail) = &config.gmail {
            match SmtpEmailTransport::gmail(gmail, &config.from_address, timeout) {
                Ok(transport) => Some(Arc::new(transport)),
                Err(e) => {
                    warn!("Gmail transport unavailable: {}", e);
                    None
                }
            }
        } else if let Some(settings) = &config.smtp {
            match SmtpEmailTransport::relay(settings, &config.from_address, timeout) {
                Ok(transport) => Some(Arc::new(transport)),
                Err(e) => {
                    warn!("SMTP transport unavailable: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let api: Option<Arc<dyn EmailTransport>> =
            config.resend_api_key.as_ref().and_then(|key| {
                match ResendEmailTransport::new(key, &config.from_address, timeout) {
                    Ok(transport) => Some(Arc::new(transport) as Arc<dyn EmailTransport>),
                    Err(e) => {
                        warn!("Resend transport unavailable: {}", e);
                        None
                    }
                }
            });

        Self { config, smtp, api }
    }

    /// Builds a sender over explicit transports. Used by tests and by setups
    /// that bring their own delivery channel.
    pub fn with_transports(
        config: EmailConfig,
        smtp: Option<Arc<dyn EmailTransport>>,
        api: Option<Arc<dyn EmailTransport>>,
    ) -> Self {
        Self { config, smtp, api }
    }

    /// The configuration this sender was built with (used by diagnostics).
    pub fn config(&self) -> &EmailConfig {
        &self.config
    }

    /// Delivers a message through the best available channel. Never fails.
    pub async fn send(&self, message: &EmailMessage) -> EmailOutcome {
        let provider = self.config.active_provider();
        info!(
            "Sending \"{}\" to {} via {}",
            message.subject,
            message.to,
            provider.as_str()
        );

        match provider {
            EmailProvider::Simulated => {
                let error = if self.config.force_simulation {
                    info!("Simulation forced by configuration; skipping all transports");
                    None
                } else {
                    Some("no email provider configured".to_string())
                };
                simulated_outcome(error, 0)
            }
            EmailProvider::GmailSmtp | EmailProvider::Smtp => {
                self.send_via_smtp(provider, message).await
            }
            EmailProvider::ResendApi => self.send_via_api(message, 0).await,
        }
    }

    /// SMTP retry loop: transient network errors retry up to the configured
    /// bound with linear backoff (attempt x base delay); anything else aborts
    /// immediately and falls through.
    async fn send_via_smtp(&self, provider: EmailProvider, message: &EmailMessage) -> EmailOutcome {
        let Some(transport) = &self.smtp else {
            return self
                .fall_through(
                    message,
                    0,
                    EmailError::Smtp("SMTP transport unavailable".to_string()),
                )
                .await;
        };

        let policy = &self.config.policy;
        let mut attempts = 0;
        let last_error;

        loop {
            attempts += 1;
            info!(
                "SMTP attempt {}/{} via {}",
                attempts,
                policy.max_attempts,
                provider.as_str()
            );

            match transport.send_email(message).await {
                Ok(message_id) => {
                    return EmailOutcome {
                        message_id,
                        provider,
                        simulated: false,
                        attempts,
                        error: None,
                    };
                }
                Err(e) if e.is_transient() && attempts < policy.max_attempts => {
                    let delay = policy.backoff_base * attempts;
                    warn!(
                        "Transient failure on attempt {}: {}; retrying in {:?}",
                        attempts, e, delay
                    );
                    sleep(delay).await;
                }
                Err(e) => {
                    warn!("SMTP delivery abandoned after {} attempt(s): {}", attempts, e);
                    last_error = e;
                    break;
                }
            }
        }

        self.fall_through(message, attempts, last_error).await
    }

    /// After SMTP gives up: try the hosted API when a key is configured,
    /// otherwise simulate with the SMTP error attached.
    async fn fall_through(
        &self,
        message: &EmailMessage,
        attempts: u32,
        error: EmailError,
    ) -> EmailOutcome {
        let Some(api) = &self.api else {
            return simulated_outcome(Some(error.to_string()), attempts);
        };

        info!("Falling back to the hosted email API after: {}", error);
        match api.send_email(message).await {
            Ok(message_id) => EmailOutcome {
                message_id,
                provider: EmailProvider::ResendApi,
                simulated: false,
                attempts: attempts + 1,
                error: None,
            },
            Err(api_error) => simulated_outcome(
                Some(format!("{}; API fallback failed: {}", error, api_error)),
                attempts + 1,
            ),
        }
    }

    /// Single-attempt delivery through the hosted API, simulating on failure.
    async fn send_via_api(&self, message: &EmailMessage, prior_attempts: u32) -> EmailOutcome {
        let Some(api) = &self.api else {
            return simulated_outcome(
                Some("email API transport unavailable".to_string()),
                prior_attempts,
            );
        };

        match api.send_email(message).await {
            Ok(message_id) => EmailOutcome {
                message_id,
                provider: EmailProvider::ResendApi,
                simulated: false,
                attempts: prior_attempts + 1,
                error: None,
            },
            Err(e) => {
                warn!("Hosted email API failed: {}", e);
                simulated_outcome(Some(e.to_string()), prior_attempts + 1)
            }
        }
    }
}

/// Terminal state of the chain: a fabricated success with a deterministic
/// pseudo-identifier and the causing error attached.
fn simulated_outcome(error: Option<String>, attempts: u32) -> EmailOutcome {
    let message_id = format!("sim-{}", chrono::Utc::now().timestamp_millis());
    info!(
        "Email simulated as {} ({})",
        message_id,
        error.as_deref().unwrap_or("forced")
    );

    EmailOutcome {
        message_id,
        provider: EmailProvider::Simulated,
        simulated: true,
        attempts,
        error,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::config::{DeliveryPolicy, GmailCredentials, SmtpSettings};

    /// Counts calls and fails every attempt with the configured error.
    struct FailingTransport {
        calls: Arc<AtomicU32>,
        transient: bool,
    }

    #[async_trait]
    impl EmailTransport for FailingTransport {
        async fn send_email(&self, _message: &EmailMessage) -> Result<String, EmailError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.transient {
                Err(EmailError::TransientNetwork(
                    "connection refused".to_string(),
                ))
            } else {
                Err(EmailError::Smtp("535 authentication failed".to_string()))
            }
        }
    }

    /// Counts calls and succeeds with a fixed id.
    struct SucceedingTransport {
        calls: Arc<AtomicU32>,
        id: &'static str,
    }

    #[async_trait]
    impl EmailTransport for SucceedingTransport {
        async fn send_email(&self, _message: &EmailMessage) -> Result<String, EmailError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.id.to_string())
        }
    }

    fn message() -> EmailMessage {
        EmailMessage {
            to: "traveler@example.com".to_string(),
            subject: "Your booking".to_string(),
            html_body: "<p>Confirmed</p>".to_string(),
            text_body: None,
        }
    }

    fn fast_policy(max_attempts: u32) -> DeliveryPolicy {
        DeliveryPolicy {
            max_attempts,
            backoff_base: Duration::from_millis(1),
            timeout: Duration::from_secs(1),
        }
    }

    fn gmail_config(max_attempts: u32) -> EmailConfig {
        EmailConfig {
            gmail: Some(GmailCredentials {
                user: "guides@gmail.com".to_string(),
                password: "app-password".to_string(),
            }),
            policy: fast_policy(max_attempts),
            ..EmailConfig::default()
        }
    }

    fn smtp_config(max_attempts: u32) -> EmailConfig {
        EmailConfig {
            smtp: Some(SmtpSettings {
                host: "mail.example.com".to_string(),
                port: 587,
                user: "mailer".to_string(),
                password: "secret".to_string(),
            }),
            policy: fast_policy(max_attempts),
            ..EmailConfig::default()
        }
    }

    #[tokio::test]
    async fn transient_errors_retry_to_the_configured_bound() {
        let calls = Arc::new(AtomicU32::new(0));
        let sender = EmailSender::with_transports(
            gmail_config(3),
            Some(Arc::new(FailingTransport {
                calls: calls.clone(),
                transient: true,
            })),
            None,
        );

        let outcome = sender.send(&message()).await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(outcome.attempts, 3);
        assert!(outcome.simulated);
        assert!(outcome.error.is_some());
    }

    #[tokio::test]
    async fn fatal_errors_never_retry() {
        let calls = Arc::new(AtomicU32::new(0));
        let sender = EmailSender::with_transports(
            smtp_config(5),
            Some(Arc::new(FailingTransport {
                calls: calls.clone(),
                transient: false,
            })),
            None,
        );

        let outcome = sender.send(&message()).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.attempts, 1);
        assert!(outcome.simulated);
    }

    #[tokio::test]
    async fn unconfigured_sender_simulates_with_a_patterned_id() {
        let sender = EmailSender::with_transports(EmailConfig::default(), None, None);

        let outcome = sender.send(&message()).await;

        assert!(outcome.simulated);
        assert_eq!(outcome.provider, EmailProvider::Simulated);
        assert_eq!(outcome.attempts, 0);
        assert_eq!(
            outcome.error.as_deref(),
            Some("no email provider configured")
        );

        let suffix = outcome.message_id.strip_prefix("sim-").expect("sim prefix");
        assert!(suffix.parse::<i64>().is_ok());
    }

    #[tokio::test]
    async fn forced_simulation_invokes_no_transport() {
        let smtp_calls = Arc::new(AtomicU32::new(0));
        let api_calls = Arc::new(AtomicU32::new(0));
        let config = EmailConfig {
            force_simulation: true,
            ..gmail_config(3)
        };
        let sender = EmailSender::with_transports(
            config,
            Some(Arc::new(SucceedingTransport {
                calls: smtp_calls.clone(),
                id: "smtp-id",
            })),
            Some(Arc::new(SucceedingTransport {
                calls: api_calls.clone(),
                id: "api-id",
            })),
        );

        let outcome = sender.send(&message()).await;

        assert!(outcome.simulated);
        assert!(outcome.error.is_none());
        assert_eq!(smtp_calls.load(Ordering::SeqCst), 0);
        assert_eq!(api_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn smtp_exhaustion_falls_through_to_the_hosted_api() {
        let smtp_calls = Arc::new(AtomicU32::new(0));
        let api_calls = Arc::new(AtomicU32::new(0));
        let config = EmailConfig {
            resend_api_key: Some("re_123".to_string()),
            ..gmail_config(2)
        };
        let sender = EmailSender::with_transports(
            config,
            Some(Arc::new(FailingTransport {
                calls: smtp_calls.clone(),
                transient: true,
            })),
            Some(Arc::new(SucceedingTransport {
                calls: api_calls.clone(),
                id: "resend-id",
            })),
        );

        let outcome = sender.send(&message()).await;

        assert_eq!(smtp_calls.load(Ordering::SeqCst), 2);
        assert_eq!(api_calls.load(Ordering::SeqCst), 1);
        assert!(!outcome.simulated);
        assert_eq!(outcome.provider, EmailProvider::ResendApi);
        assert_eq!(outcome.message_id, "resend-id");
        assert_eq!(outcome.attempts, 3);
    }

    #[tokio::test]
    async fn api_fallback_failure_still_reports_simulated_success() {
        let config = EmailConfig {
            resend_api_key: Some("re_123".to_string()),
            ..gmail_config(1)
        };
        let sender = EmailSender::with_transports(
            config,
            Some(Arc::new(FailingTransport {
                calls: Arc::new(AtomicU32::new(0)),
                transient: true,
            })),
            Some(Arc::new(FailingTransport {
                calls: Arc::new(AtomicU32::new(0)),
                transient: false,
            })),
        );

        let outcome = sender.send(&message()).await;

        assert!(outcome.simulated);
        let error = outcome.error.expect("causing error attached");
        assert!(error.contains("API fallback failed"));
    }

    #[tokio::test]
    async fn first_attempt_success_reports_the_real_provider() {
        let calls = Arc::new(AtomicU32::new(0));
        let sender = EmailSender::with_transports(
            gmail_config(3),
            Some(Arc::new(SucceedingTransport {
                calls: calls.clone(),
                id: "gmail-id",
            })),
            None,
        );

        let outcome = sender.send(&message()).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!outcome.simulated);
        assert_eq!(outcome.provider, EmailProvider::GmailSmtp);
        assert_eq!(outcome.attempts, 1);
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn api_only_configuration_sends_a_single_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let config = EmailConfig {
            resend_api_key: Some("re_123".to_string()),
            policy: fast_policy(3),
            ..EmailConfig::default()
        };
        let sender = EmailSender::with_transports(
            config,
            None,
            Some(Arc::new(FailingTransport {
                calls: calls.clone(),
                transient: true,
            })),
        );

        let outcome = sender.send(&message()).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(outcome.simulated);
        assert_eq!(outcome.attempts, 1);
    }
}
