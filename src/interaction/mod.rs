//! Event handling for review-bell.
//!
//! Every inbound webhook goes through all three handlers:
//! - Mentions in issues, pull requests, and comments.
//! - Review requests, de-duplicated through the record store.
//! - Submitted reviews.
//!
//! Each handler decides on its own whether the event concerns it. The
//! notifications they produce are posted to the chat client one by one.

pub mod mention;
pub mod review_requested;
pub mod review_submitted;

use tracing::{error, info, instrument, warn};

use crate::{
    base::{
        github::{EventKind, GithubEvent},
        notification::Notification,
    },
    runtime::Runtime,
};

/// Handle one raw webhook delivery.
///
/// Failures are logged and never surface to the caller, since GitHub only
/// needs an acknowledgement.
#[instrument(skip_all, fields(kind = %kind_header))]
pub async fn handle_webhook(runtime: &Runtime, kind_header: &str, body: &[u8]) {
    let kind = EventKind::from_header(kind_header);

    match GithubEvent::parse(&kind, body) {
        Ok(event) => {
            let delivered = handle_github_event(runtime, &event).await;
            info!("Delivered {} notification(s).", delivered);
        }
        Err(err) => error!("Error while parsing: {:#}", err),
    }
}

/// Run every handler against the event and send what they produce.
///
/// Returns the number of notifications that were delivered.
#[instrument(skip_all, fields(kind = %event.kind()))]
pub async fn handle_github_event(runtime: &Runtime, event: &GithubEvent) -> usize {
    if let GithubEvent::Unsupported(name) = event {
        info!("Ignoring unsupported `{}` event.", name);
        return 0;
    }

    let color = runtime.config.attachment_color.as_str();
    let mut delivered = 0;

    let notification = mention::handle_mention(event, &runtime.directory, color);
    delivered += deliver(runtime, notification).await;

    match review_requested::handle_review_requested(event, &runtime.directory, &runtime.records, color).await {
        Ok(notification) => delivered += deliver(runtime, notification).await,
        Err(err) => error!("Error while handling review request: {:#}", err),
    }

    let notification = review_submitted::handle_review_submitted(event, &runtime.directory, color);
    delivered += deliver(runtime, notification).await;

    delivered
}

async fn deliver(runtime: &Runtime, notification: Option<Notification>) -> usize {
    let Some(notification) = notification else {
        return 0;
    };

    match runtime.chat.send_notification(&notification).await {
        Ok(()) => 1,
        Err(err) => {
            warn!("Notification was not delivered: {:#}", err);
            0
        }
    }
}
