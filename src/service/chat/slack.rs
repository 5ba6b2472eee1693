//! Slack integration for review-bell.
//!
//! Notifications are posted through a Slack incoming webhook, so no bot token
//! or socket connection is needed. The webhook decides the target channel.

use crate::base::{
    config::Config,
    notification::{Attachment, Notification},
    types::{Res, Void},
};
use anyhow::Context;
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::prelude::*;
use tracing::{info, instrument};
use url::Url;

use std::sync::Arc;

use super::{ChatClient, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub fn slack(config: &Config) -> Res<Self> {
        let client = SlackChatClient::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    pub webhook_url: Url,
    pub client: Arc<FullClient>,
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        let webhook_url = Url::parse(&config.slack_webhook_url).context("Invalid Slack webhook URL")?;

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        Ok(Self { webhook_url, client })
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    #[instrument(skip_all)]
    async fn send_notification(&self, notification: &Notification) -> Void {
        let request = SlackApiPostWebhookMessageRequest::new(message_content(notification));

        self.client
            .post_webhook_message(&self.webhook_url, &request)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send notification: {}", e))?;

        info!("Slack notify: {}", notification.text);
        if let Some(attachment) = &notification.attachment {
            info!("Slack notify as attachment: {}", attachment.text);
        }

        Ok(())
    }
}

/// Build the Slack message body for a notification.
fn message_content(notification: &Notification) -> SlackMessageContent {
    let content = SlackMessageContent::new().with_text(notification.text.clone());

    match &notification.attachment {
        Some(attachment) => content.with_attachments(vec![slack_attachment(attachment)]),
        None => content,
    }
}

fn slack_attachment(attachment: &Attachment) -> SlackMessageAttachment {
    let mut result = SlackMessageAttachment::new().with_color(attachment.color.clone()).with_text(attachment.text.clone());

    if attachment.markdown {
        result = result.with_mrkdwn_in(vec!["text".to_string()]);
    }

    result
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_without_attachment() {
        let content = message_content(&Notification::new(":wave: <@U1>, *mentioned* by carol in u"));

        assert_eq!(content.text.as_deref(), Some(":wave: <@U1>, *mentioned* by carol in u"));
        assert!(content.attachments.is_none());
    }

    #[test]
    fn test_message_with_attachment() {
        let notification = Notification::new("text").with_attachment("#36a64f", "please look");
        let content = message_content(&notification);

        let attachments = content.attachments.expect("attachment is set");
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].color.as_deref(), Some("#36a64f"));
        assert_eq!(attachments[0].text.as_deref(), Some("please look"));
        assert_eq!(attachments[0].mrkdwn_in, Some(vec!["text".to_string()]));
    }
}
