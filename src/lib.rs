//! Library root for `review-bell`.
//!
//! Review-bell receives GitHub webhooks and pings people on Slack when:
//! - They are mentioned in an issue, a pull request, or a comment
//! - Their review is requested on a pull request
//! - Their pull request receives a review
//!
//! Review requests are de-duplicated through a small record store so a burst
//! of webhook deliveries pings each reviewer once.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the review-bell runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with the chat client and record store
/// - Serves the webhook endpoint until Ctrl-C
pub async fn start(config: Config) -> Void {
    info!("Starting review-bell ...");

    // Start the crypto provider; it may already be installed by the host.
    let _ = crypto::aws_lc_rs::default_provider().install_default();

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config)?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
