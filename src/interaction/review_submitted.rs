//! Notifies the pull request author when a review is submitted.

use tracing::{info, instrument};

use crate::base::{
    github::{Action, GithubEvent, ReviewState},
    mention::{MentionDirectory, find_mentions},
    notification::{Indicator, Notification},
};

/// Build the review notification for an event, if anybody should be pinged.
///
/// Nobody is pinged for a review on one's own pull request. An empty
/// `commented` review is the shell GitHub creates around line comments, which
/// already notify on their own, so it is skipped as well.
#[instrument(skip_all)]
pub fn handle_review_submitted(event: &GithubEvent, directory: &MentionDirectory, attachment_color: &str) -> Option<Notification> {
    let GithubEvent::PullRequestReview(payload) = event else {
        return None;
    };

    if payload.action != Action::Submitted {
        return None;
    }

    info!("Review submitted handler fired.");

    let review = &payload.review;
    let reviewer = &review.user;
    let author = &payload.pull_request.user;

    if reviewer.login == author.login {
        info!("Reviewer is the author ({}). Skipped.", reviewer.login);
        return None;
    }

    if review.state == ReviewState::Commented && review.body.trim().is_empty() {
        info!("Empty comment review. Skipped.");
        return None;
    }

    let mut mentioned = find_mentions(&review.body);
    mentioned.insert(author.mention());

    let users = directory.render(&mentioned);
    if users.is_empty() {
        info!("No mentioned user. Skipped.");
        return None;
    }

    let text = format!(
        "{} {}, *review {}* by {} in {}",
        Indicator::Review(review.state.clone()).emoji(),
        users,
        review.state,
        reviewer.login,
        review.html_url
    );

    Some(Notification::new(text).with_attachment(attachment_color, &review.body))
}

// Tests.
