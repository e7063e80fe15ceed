use std::env;
use std::time::Duration;

use crate::types::EmailProvider;

/// Credentials for sending through a Gmail account.
#[derive(Debug, Clone)]
pub struct GmailCredentials {
    /// Gmail account address
    pub user: String,
    /// App password for the account
    pub password: String,
}

/// Settings for a generic SMTP relay.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    /// Relay hostname
    pub host: String,
    /// Submission port (587 unless overridden)
    pub port: u16,
    /// Relay username
    pub user: String,
    /// Relay password
    pub password: String,
}

/// Retry and timeout policy for outbound sends.
#[derive(Debug, Clone)]
pub struct DeliveryPolicy {
    /// Maximum attempts per SMTP send (default: 3)
    pub max_attempts: u32,
    /// Base delay of the linear backoff; attempt N waits N x base (default: 1s)
    pub backoff_base: Duration,
    /// Connection/socket timeout for outbound transports (default: 10s)
    pub timeout: Duration,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Full configuration for the email delivery chain.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Skip every real channel and simulate immediately
    pub force_simulation: bool,
    /// Gmail credentials, when both user and password are present
    pub gmail: Option<GmailCredentials>,
    /// Generic SMTP settings, when host and credentials are present
    pub smtp: Option<SmtpSettings>,
    /// Hosted email API key
    pub resend_api_key: Option<String>,
    /// From address used on every outbound message
    pub from_address: String,
    /// Recipient of administrative notifications
    pub admin_email: String,
    /// Retry/timeout policy
    pub policy: DeliveryPolicy,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            force_simulation: false,
            gmail: None,
            smtp: None,
            resend_api_key: None,
            from_address: "Plan A Bariloche <no-reply@planabariloche.com>".to_string(),
            admin_email: "admin@planabariloche.com".to_string(),
            policy: DeliveryPolicy::default(),
        }
    }
}

impl EmailConfig {
    /// Builds the configuration from environment variables.
    ///
    /// A provider only counts as configured when every variable it needs is
    /// set and non-empty: `EMAIL_USER`+`EMAIL_PASSWORD` for Gmail,
    /// `SMTP_HOST`+`SMTP_USER`+`SMTP_PASSWORD` (optional `SMTP_PORT`) for a
    /// generic relay, `RESEND_API_KEY` for the hosted API.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let force_simulation = env::var("DEV_FORCE_EMAIL_SIMULATION")
            .map(|value| value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let gmail = match (non_empty("EMAIL_USER"), non_empty("EMAIL_PASSWORD")) {
            (Some(user), Some(password)) => Some(GmailCredentials { user, password }),
            _ => None,
        };

        let smtp = match (
            non_empty("SMTP_HOST"),
            non_empty("SMTP_USER"),
            non_empty("SMTP_PASSWORD"),
        ) {
            (Some(host), Some(user), Some(password)) => {
                let port = non_empty("SMTP_PORT")
                    .and_then(|value| value.parse().ok())
                    .unwrap_or(587);
                Some(SmtpSettings {
                    host,
                    port,
                    user,
                    password,
                })
            }
            _ => None,
        };

        let mut policy = DeliveryPolicy::default();
        if let Some(max_attempts) = non_empty("EMAIL_MAX_RETRIES").and_then(|v| v.parse().ok()) {
            policy.max_attempts = max_attempts;
        }

        Self {
            force_simulation,
            gmail,
            smtp,
            resend_api_key: non_empty("RESEND_API_KEY"),
            from_address: non_empty("EMAIL_FROM").unwrap_or(defaults.from_address),
            admin_email: non_empty("ADMIN_EMAIL").unwrap_or(defaults.admin_email),
            policy,
        }
    }

    /// The channel a send will go through first under this configuration.
    pub fn active_provider(&self) -> EmailProvider {
        if self.force_simulation {
            return EmailProvider::Simulated;
        }
        if self.gmail.is_some() {
            return EmailProvider::GmailSmtp;
        }
        if self.smtp.is_some() {
            return EmailProvider::Smtp;
        }
        if self.resend_api_key.is_some() {
            return EmailProvider::ResendApi;
        }
        EmailProvider::Simulated
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gmail() -> Option<GmailCredentials> {
        Some(GmailCredentials {
            user: "guides@gmail.com".to_string(),
            password: "app-password".to_string(),
        })
    }

    fn smtp() -> Option<SmtpSettings> {
        Some(SmtpSettings {
            host: "mail.example.com".to_string(),
            port: 587,
            user: "mailer".to_string(),
            password: "secret".to_string(),
        })
    }

    #[test]
    fn unconfigured_falls_back_to_simulation() {
        let config = EmailConfig::default();
        assert_eq!(config.active_provider(), EmailProvider::Simulated);
    }

    #[test]
    fn gmail_wins_over_every_other_provider() {
        let config = EmailConfig {
            gmail: gmail(),
            smtp: smtp(),
            resend_api_key: Some("re_123".to_string()),
            ..EmailConfig::default()
        };
        assert_eq!(config.active_provider(), EmailProvider::GmailSmtp);
    }

    #[test]
    fn smtp_wins_over_the_hosted_api() {
        let config = EmailConfig {
            smtp: smtp(),
            resend_api_key: Some("re_123".to_string()),
            ..EmailConfig::default()
        };
        assert_eq!(config.active_provider(), EmailProvider::Smtp);
    }

    #[test]
    fn api_key_alone_selects_the_hosted_api() {
        let config = EmailConfig {
            resend_api_key: Some("re_123".to_string()),
            ..EmailConfig::default()
        };
        assert_eq!(config.active_provider(), EmailProvider::ResendApi);
    }

    #[test]
    fn forced_simulation_overrides_full_configuration() {
        let config = EmailConfig {
            force_simulation: true,
            gmail: gmail(),
            smtp: smtp(),
            resend_api_key: Some("re_123".to_string()),
            ..EmailConfig::default()
        };
        assert_eq!(config.active_provider(), EmailProvider::Simulated);
    }
}
