//! Runtime services and shared state for review-bell.

use tracing::instrument;

use crate::{
    base::{
        config::Config,
        mention::MentionDirectory,
        types::{Res, Void},
    },
    service::{chat::ChatClient, record::RecordClient, webhook},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the chat client, the record store, the mention directory,
/// and configuration. It is designed to be trivially cloneable, allowing it to
/// be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The chat client instance.
    pub chat: ChatClient,
    /// The review request record store.
    pub records: RecordClient,
    /// GitHub to Slack handle translation.
    pub directory: MentionDirectory,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub fn new(config: Config) -> Res<Self> {
        // Initialize the slack client.
        let chat = ChatClient::slack(&config)?;

        // Initialize the record store.
        let records = RecordClient::file(&config);

        let directory = MentionDirectory::new(&config.github_to_slack);

        Ok(Self { config, chat, records, directory })
    }

    /// Assemble a runtime from already constructed services.
    pub fn with_services(config: Config, chat: ChatClient, records: RecordClient) -> Self {
        let directory = MentionDirectory::new(&config.github_to_slack);

        Self { config, chat, records, directory }
    }

    pub async fn start(&self) -> Void {
        webhook::serve(self.clone()).await
    }
}
