//! The outbound notification model.

use super::github::ReviewState;

/// What a notification is about; each variant has its own emoji.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indicator {
    Mentioned,
    ReviewRequested,
    Review(ReviewState),
}

impl Indicator {
    pub fn emoji(&self) -> &'static str {
        match self {
            Indicator::Mentioned => ":wave:",
            Indicator::ReviewRequested => ":triangular_flag_on_post:",
            Indicator::Review(ReviewState::Commented) => ":speech_balloon:",
            Indicator::Review(ReviewState::ChangesRequested) => ":construction:",
            Indicator::Review(ReviewState::Approved) => ":white_check_mark:",
            Indicator::Review(ReviewState::Dismissed | ReviewState::Unknown(_)) => ":bell:",
        }
    }
}

/// The secondary block shown under the main text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub color: String,
    pub text: String,
    /// Whether Slack should render `text` as mrkdwn.
    pub markdown: bool,
}

/// A message ready to be handed to the chat client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub text: String,
    pub attachment: Option<Attachment>,
}

impl Notification {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), attachment: None }
    }

    /// Attach a markdown block, unless the text is empty.
    pub fn with_attachment(mut self, color: &str, text: &str) -> Self {
        self.attachment = (!text.is_empty()).then(|| Attachment {
            color: color.to_string(),
            text: text.to_string(),
            markdown: true,
        });

        self
    }
}

// Tests.
