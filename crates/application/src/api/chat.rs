//! Support chat operations.

use kennel_domain::{Conversation, ConversationDetail, ConversationStats, Message, OutgoingMessage};

use crate::client::ApiClient;
use crate::config::endpoints;
use crate::error::{ClientError, ClientResult};

/// Support chat operations.
pub struct ChatApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ChatApi<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Every conversation known to the gateway.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`ClientError`] when the request fails.
    pub async fn conversations(&self) -> ClientResult<Vec<Conversation>> {
        self.client.get(endpoints::CONVERSATIONS, None).await
    }

    /// One conversation with its full message history.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`ClientError`] when the request fails.
    pub async fn conversation(&self, id: &str) -> ClientResult<ConversationDetail> {
        self.client.get(&endpoints::conversation(id), None).await
    }

    /// Messages in a conversation strictly after the given message id.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`ClientError`] when the request fails.
    pub async fn messages_after(
        &self,
        conversation_id: &str,
        last_id: &str,
    ) -> ClientResult<Vec<Message>> {
        let query =
            serde_urlencoded::to_string([("conversationId", conversation_id), ("lastId", last_id)])
                .map_err(|e| ClientError::InvalidBody(e.to_string()))?;
        self.client.get(endpoints::MESSAGES, Some(query)).await
    }

    /// Sends a staff message into a conversation.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`ClientError`] when the request fails.
    pub async fn send(&self, message: &OutgoingMessage) -> ClientResult<()> {
        self.client.post_with_ack(endpoints::SEND_MESSAGE, message).await
    }

    /// Marks one message read.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`ClientError`] when the request fails.
    pub async fn mark_read(&self, message_id: &str) -> ClientResult<()> {
        self.client.put_ack(&endpoints::mark_read(message_id)).await
    }

    /// Reactivates a conversation on the server.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`ClientError`] when the request fails.
    pub async fn activate(&self, id: &str) -> ClientResult<()> {
        self.client.post_ack(&endpoints::activate(id)).await
    }

    /// Closes a conversation on the server.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`ClientError`] when the request fails.
    pub async fn close(&self, id: &str) -> ClientResult<()> {
        self.client.post_ack(&endpoints::close(id)).await
    }

    /// Fetches every conversation and aggregates the dashboard counters.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`ClientError`] when the request fails.
    pub async fn statistics(&self) -> ClientResult<ConversationStats> {
        Ok(ConversationStats::summarize(&self.conversations().await?))
    }
}
