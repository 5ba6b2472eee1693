//! Typed GitHub webhook events.
//!
//! Only the fields the notifier reads are modelled. Everything else in the
//! payload is ignored by `serde`.

use std::fmt;

use anyhow::Context;
use serde::Deserialize;
use serde_with::{DefaultOnNull, serde_as};

use super::types::Res;

// Discriminators.

/// The event kind carried by the `X-GitHub-Event` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Issues,
    PullRequest,
    PullRequestReview,
    IssueComment,
    PullRequestReviewComment,
    Other(String),
}

impl EventKind {
    pub fn from_header(value: &str) -> Self {
        match value {
            // Older hook configurations report `issue`.
            "issues" | "issue" => EventKind::Issues,
            "pull_request" => EventKind::PullRequest,
            "pull_request_review" => EventKind::PullRequestReview,
            "issue_comment" => EventKind::IssueComment,
            "pull_request_review_comment" => EventKind::PullRequestReviewComment,
            other => EventKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Issues => "issues",
            EventKind::PullRequest => "pull_request",
            EventKind::PullRequestReview => "pull_request_review",
            EventKind::IssueComment => "issue_comment",
            EventKind::PullRequestReviewComment => "pull_request_review_comment",
            EventKind::Other(other) => other.as_str(),
        };

        f.write_str(name)
    }
}

/// The `action` field of a webhook payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Opened,
    Created,
    Edited,
    ReviewRequested,
    Submitted,
    #[serde(other)]
    Other,
}

/// The state of a submitted pull request review.
///
/// States this crate does not know about keep the string GitHub sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Unknown(String),
}

impl ReviewState {
    pub fn from_raw(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "approved" => ReviewState::Approved,
            "changes_requested" => ReviewState::ChangesRequested,
            "commented" => ReviewState::Commented,
            "dismissed" => ReviewState::Dismissed,
            _ => ReviewState::Unknown(value.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ReviewState::Approved => "approved",
            ReviewState::ChangesRequested => "changes_requested",
            ReviewState::Commented => "commented",
            ReviewState::Dismissed => "dismissed",
            ReviewState::Unknown(raw) => raw,
        }
    }
}

impl<'de> Deserialize<'de> for ReviewState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;

        Ok(ReviewState::from_raw(&raw))
    }
}

impl fmt::Display for ReviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Payload objects.

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub login: String,
}

impl User {
    /// The login as it would appear in a mention.
    pub fn mention(&self) -> String {
        format!("@{}", self.login)
    }
}

/// An issue, a pull request body, or a comment: anything with an author and text.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    pub html_url: String,
    pub user: User,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub body: String,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub id: u64,
    pub html_url: String,
    pub user: User,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub requested_reviewers: Vec<User>,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct Review {
    pub html_url: String,
    pub user: User,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub body: String,
    pub state: ReviewState,
}

/// The parent issue or pull request of a comment; only its author is of interest.
///
/// Bot-authored payloads sometimes omit the author, so everything is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Parent {
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Changes {
    #[serde(default)]
    pub body: Option<ChangedText>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangedText {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub from: String,
}

// Event payloads.

#[derive(Debug, Clone, Deserialize)]
pub struct IssuesPayload {
    pub action: Action,
    pub issue: Post,
    #[serde(default)]
    pub changes: Option<Changes>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestPayload {
    pub action: Action,
    pub pull_request: PullRequest,
    #[serde(default)]
    pub changes: Option<Changes>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestReviewPayload {
    pub action: Action,
    pub review: Review,
    pub pull_request: PullRequest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueCommentPayload {
    pub action: Action,
    pub comment: Post,
    #[serde(default)]
    pub issue: Option<Parent>,
    #[serde(default)]
    pub changes: Option<Changes>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestReviewCommentPayload {
    pub action: Action,
    pub comment: Post,
    #[serde(default)]
    pub pull_request: Option<Parent>,
    #[serde(default)]
    pub changes: Option<Changes>,
}

// Events.

/// An inbound webhook event, discriminated by its kind.
#[derive(Debug, Clone)]
pub enum GithubEvent {
    Issues(IssuesPayload),
    PullRequest(PullRequestPayload),
    PullRequestReview(PullRequestReviewPayload),
    IssueComment(IssueCommentPayload),
    PullRequestReviewComment(PullRequestReviewCommentPayload),
    Unsupported(String),
}

impl GithubEvent {
    /// Parse a webhook body according to the kind announced in the headers.
    pub fn parse(kind: &EventKind, body: &[u8]) -> Res<Self> {
        let event = match kind {
            EventKind::Issues => GithubEvent::Issues(from_body(kind, body)?),
            EventKind::PullRequest => GithubEvent::PullRequest(from_body(kind, body)?),
            EventKind::PullRequestReview => GithubEvent::PullRequestReview(from_body(kind, body)?),
            EventKind::IssueComment => GithubEvent::IssueComment(from_body(kind, body)?),
            EventKind::PullRequestReviewComment => GithubEvent::PullRequestReviewComment(from_body(kind, body)?),
            EventKind::Other(name) => GithubEvent::Unsupported(name.clone()),
        };

        Ok(event)
    }

    /// The kind this event was parsed as.
    pub fn kind(&self) -> EventKind {
        match self {
            GithubEvent::Issues(_) => EventKind::Issues,
            GithubEvent::PullRequest(_) => EventKind::PullRequest,
            GithubEvent::PullRequestReview(_) => EventKind::PullRequestReview,
            GithubEvent::IssueComment(_) => EventKind::IssueComment,
            GithubEvent::PullRequestReviewComment(_) => EventKind::PullRequestReviewComment,
            GithubEvent::Unsupported(name) => EventKind::Other(name.clone()),
        }
    }
}

fn from_body<T>(kind: &EventKind, body: &[u8]) -> Res<T>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_slice(body).with_context(|| format!("Malformed `{kind}` payload"))
}

// Tests.
