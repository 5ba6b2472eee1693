//! Notifies people who are mentioned in an issue, a pull request, or a comment.

use tracing::{debug, info, instrument};

use crate::base::{
    github::{Action, Changes, GithubEvent, User},
    mention::{MentionDirectory, find_mentions, find_new_mentions},
    notification::{Indicator, Notification},
};

/// The parts of a post the mention handler looks at.
struct Posted<'a> {
    action: Action,
    url: &'a str,
    author: &'a User,
    body: &'a str,
    /// The body before an edit, when the edit touched the body.
    previous: Option<&'a str>,
    /// The author of the issue or pull request a comment belongs to.
    owner: Option<&'a User>,
}

/// Build the mention notification for an event, if anybody should be pinged.
///
/// New posts ping everybody mentioned, edits ping only the mentions the edit
/// added. A new comment also pings the owner of the parent issue or pull
/// request, unless the owner wrote the comment.
#[instrument(skip_all)]
pub fn handle_mention(event: &GithubEvent, directory: &MentionDirectory, attachment_color: &str) -> Option<Notification> {
    let posted = match event {
        GithubEvent::Issues(payload) => Posted {
            action: payload.action,
            url: &payload.issue.html_url,
            author: &payload.issue.user,
            body: &payload.issue.body,
            previous: previous_body(&payload.changes),
            owner: None,
        },
        GithubEvent::PullRequest(payload) => Posted {
            action: payload.action,
            url: &payload.pull_request.html_url,
            author: &payload.pull_request.user,
            body: &payload.pull_request.body,
            previous: previous_body(&payload.changes),
            owner: None,
        },
        GithubEvent::IssueComment(payload) => Posted {
            action: payload.action,
            url: &payload.comment.html_url,
            author: &payload.comment.user,
            body: &payload.comment.body,
            previous: previous_body(&payload.changes),
            owner: payload.issue.as_ref().and_then(|issue| issue.user.as_ref()),
        },
        GithubEvent::PullRequestReviewComment(payload) => Posted {
            action: payload.action,
            url: &payload.comment.html_url,
            author: &payload.comment.user,
            body: &payload.comment.body,
            previous: previous_body(&payload.changes),
            owner: payload.pull_request.as_ref().and_then(|pr| pr.user.as_ref()),
        },
        GithubEvent::PullRequestReview(_) | GithubEvent::Unsupported(_) => return None,
    };

    let mut mentioned = match posted.action {
        Action::Opened | Action::Created => find_mentions(posted.body),
        // An edit without a body change carries no `changes.body`; nothing new was mentioned then.
        Action::Edited => find_new_mentions(posted.body, posted.previous.unwrap_or(posted.body)),
        Action::ReviewRequested | Action::Submitted | Action::Other => return None,
    };

    info!("Mention handler fired.");

    if posted.action == Action::Created {
        match posted.owner {
            Some(owner) if owner.login != posted.author.login => {
                mentioned.insert(owner.mention());
            }
            Some(_) => debug!("Commenter owns the thread; not adding the owner."),
            None => debug!("Payload has no owner; not adding the owner."),
        }
    }

    let users = directory.render(&mentioned);
    if users.is_empty() {
        info!("No mentioned user. Skipped.");
        return None;
    }

    let text = format!("{} {}, *mentioned* by {} in {}", Indicator::Mentioned.emoji(), users, posted.author.login, posted.url);

    Some(Notification::new(text).with_attachment(attachment_color, posted.body))
}

fn previous_body(changes: &Option<Changes>) -> Option<&str> {
    changes.as_ref().and_then(|c| c.body.as_ref()).map(|b| b.from.as_str())
}

// Tests.
