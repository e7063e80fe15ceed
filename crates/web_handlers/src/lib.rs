//! # Web Handlers for the Plan A Backend
//!
//! This crate provides the HTTP handlers, request/response types, and
//! database services for the Plan A booking marketplace.

/// Shared-token middleware guarding the admin scope
mod admin_auth;
pub use admin_auth::*;

/// Admin endpoints: email diagnostics, notifications, health
mod admin_handlers;
pub use admin_handlers::*;

/// Activity browsing and admin edit handlers
mod activity_handlers;
pub use activity_handlers::*;

/// Activity persistence
mod activity_service;
pub use activity_service::*;

/// Activity request/response types
mod activity_types;
pub use activity_types::*;

/// Booking confirmation handlers
mod booking_handlers;
pub use booking_handlers::*;

/// Booking request/response types
mod booking_types;
pub use booking_types::*;

/// Guide registration and admin management handlers
mod guide_handlers;
pub use guide_handlers::*;

/// Guide persistence
mod guide_service;
pub use guide_service::*;

/// Guide request/response types
mod guide_types;
pub use guide_types::*;

/// Review submission and listing handlers
mod review_handlers;
pub use review_handlers::*;

/// Review persistence and rating aggregation
mod review_service;
pub use review_service::*;

/// Review request/response types
mod review_types;
pub use review_types::*;
