//! Core components, types, and utilities for review-bell.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Typed GitHub webhook events.
//! - Mention extraction and chat handle translation.
//! - The outbound notification model.
//! - Common types and result handling.

pub mod config;
pub mod github;
pub mod mention;
pub mod notification;
pub mod types;
