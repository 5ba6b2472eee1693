//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services used by review-bell:
//! - Chat services (e.g., Slack incoming webhooks)
//! - The review request record store (e.g., a JSON file)
//! - The inbound webhook listener
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod record;
pub mod webhook;
