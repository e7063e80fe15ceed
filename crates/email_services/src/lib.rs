//! # Email Services
//!
//! Provider-fallback transactional email for the Plan A backend.
//! A send walks the best available channel (Gmail SMTP, generic SMTP,
//! hosted email API) with bounded retries on transient network failures,
//! and degrades to a simulated success instead of failing the caller.

/// Environment-driven configuration and provider detection
mod config;
pub use config::*;

/// Core types: messages, outcomes, delivery errors
mod types;
pub use types::*;

/// Delivery channels (SMTP via lettre, hosted API via reqwest, mock)
mod transport;
pub use transport::*;

/// The fallback chain with its retry loop and simulation terminal state
mod sender;
pub use sender::*;

/// Transactional email templates and reference-code generation
mod templates;
pub use templates::*;
