pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::{notification::Notification, types::Void};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the outbound side of the notifier: posting a formatted
/// notification to the team channel. Implementing this trait allows different
/// chat services to be used with review-bell.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Post a notification to the channel.
    ///
    /// The attachment, when present, is rendered as a colored block under the
    /// main text. Delivery is attempted once.
    async fn send_notification(&self, notification: &Notification) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
