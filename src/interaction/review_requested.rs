//! Notifies reviewers when their review is requested on a pull request.
//!
//! GitHub sends one `review_requested` event per reviewer, each listing every
//! pending reviewer. The record store remembers who was pinged recently so a
//! burst of events pings each reviewer once.

use std::collections::BTreeSet;

use tracing::{info, instrument, warn};

use crate::{
    base::{
        github::{Action, GithubEvent, User},
        mention::MentionDirectory,
        notification::{Indicator, Notification},
        types::Res,
    },
    service::record::RecordClient,
};

/// Build the review request notification for an event, if anybody should be pinged.
///
/// The record for the pull request is always replaced with the full list of
/// requested reviewers, even when nobody ends up being pinged.
#[instrument(skip_all)]
pub async fn handle_review_requested(event: &GithubEvent, directory: &MentionDirectory, records: &RecordClient, attachment_color: &str) -> Res<Option<Notification>> {
    let GithubEvent::PullRequest(payload) = event else {
        return Ok(None);
    };

    if payload.action != Action::ReviewRequested {
        return Ok(None);
    }

    info!("Review requested handler fired.");

    let pull_request = &payload.pull_request;
    let pr_id = pull_request.id.to_string();
    let requested: BTreeSet<String> = pull_request.requested_reviewers.iter().map(User::mention).collect();

    let notified: BTreeSet<String> = {
        let _guard = records.lock().await;

        let mut store = records.load().await?;
        let notified = store.query(&pr_id).into_iter().collect();

        store.insert(&pr_id, requested.iter().cloned().collect());
        if let Err(err) = records.persist(&mut store).await {
            warn!("Review request record was not stored: {:#}", err);
        }

        notified
    };
    info!("Already notified reviewers: {:?}", notified);

    let targets: BTreeSet<&String> = requested.difference(&notified).collect();

    let users = directory.render(targets);
    if users.is_empty() {
        info!("No reviewer left to notify. Skipped.");
        return Ok(None);
    }

    let text = format!(
        "{} {}, *review requested* by {} in {}",
        Indicator::ReviewRequested.emoji(),
        users,
        pull_request.user.login,
        pull_request.html_url
    );

    Ok(Some(Notification::new(text).with_attachment(attachment_color, &pull_request.body)))
}

// Tests.
