//! Live conversation view with background message polling.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use kennel_domain::{ConversationDetail, Message, OutgoingMessage, SenderType};

use crate::client::ApiClient;
use crate::error::ClientError;

/// Sender id used when no admin user is available.
const FALLBACK_SENDER: &str = "staff";

/// Errors from viewer operations.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// The operation needs an open conversation and none is open.
    #[error("no conversation is open")]
    NoConversation,

    /// The underlying client call failed.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// An open support conversation that keeps itself current.
///
/// While a conversation is open, a background task polls the gateway for
/// messages newer than the local tail and appends them; the local list
/// never shrinks or reorders. Poll failures are logged and swallowed so
/// one bad tick never kills the timer. Closing the view, reopening
/// another conversation, or dropping the viewer stops the poller.
pub struct ChatViewer {
    client: Arc<ApiClient>,
    state: Arc<RwLock<Option<ConversationDetail>>>,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl ChatViewer {
    /// Creates a viewer bound to the client. Nothing polls until a
    /// conversation is opened.
    #[must_use]
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            state: Arc::new(RwLock::new(None)),
            poller: Mutex::new(None),
        }
    }

    /// Opens a conversation: fetches its detail, marks unread customer
    /// messages read, and starts the poller.
    ///
    /// Opening while another conversation is open restarts the cycle
    /// with a fresh detail fetch.
    ///
    /// # Errors
    ///
    /// Fails when the detail fetch fails; marking individual messages
    /// read is best-effort and only logged.
    pub async fn open(&self, conversation_id: &str) -> Result<(), ViewerError> {
        self.stop_polling();

        let mut detail = self.client.chat().conversation(conversation_id).await?;
        self.mark_customer_messages_read(&mut detail).await;
        info!(
            conversation = conversation_id,
            messages = detail.messages.len(),
            "conversation opened"
        );
        *self.state.write().await = Some(detail);

        self.start_polling();
        Ok(())
    }

    /// Closes the view: stops the poller and drops the local state.
    pub async fn close(&self) {
        self.stop_polling();
        *self.state.write().await = None;
        debug!("conversation view closed");
    }

    /// Whether the background poller is currently running.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.poller_slot()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Sends a staff message into the open conversation, then reconciles
    /// the local state with a full detail reload.
    ///
    /// The sender id is the signed-in admin's id, falling back to
    /// `"staff"` when no user is available.
    ///
    /// # Errors
    ///
    /// [`ViewerError::NoConversation`] when nothing is open, otherwise
    /// the underlying client error from the send or the reload.
    pub async fn send(&self, content: impl Into<String>) -> Result<(), ViewerError> {
        let (conversation_id, user_id) = {
            let guard = self.state.read().await;
            let detail = guard.as_ref().ok_or(ViewerError::NoConversation)?;
            (detail.conversation.id.clone(), detail.conversation.user_id.clone())
        };

        let outgoing = OutgoingMessage {
            user_id,
            sender_id: self.sender_id().await,
            sender_type: SenderType::Staff,
            content: content.into(),
            conversation_id: conversation_id.clone(),
        };
        self.client.chat().send(&outgoing).await?;

        // Reconcile with the server rather than appending locally; the
        // reload carries the server-assigned id and timestamp.
        let detail = self.client.chat().conversation(&conversation_id).await?;
        *self.state.write().await = Some(detail);
        Ok(())
    }

    /// Marks every unread message in the open conversation read,
    /// whoever sent it. Per-message failures are logged and skipped.
    ///
    /// # Errors
    ///
    /// [`ViewerError::NoConversation`] when nothing is open.
    pub async fn mark_all_read(&self) -> Result<(), ViewerError> {
        let unread: Vec<String> = {
            let guard = self.state.read().await;
            let detail = guard.as_ref().ok_or(ViewerError::NoConversation)?;
            detail
                .messages
                .iter()
                .filter(|message| !message.is_read)
                .map(|message| message.id.clone())
                .collect()
        };

        for id in &unread {
            match self.client.chat().mark_read(id).await {
                Ok(()) => self.flag_read(id).await,
                Err(error) => warn!(%error, message = %id, "failed to mark message read"),
            }
        }
        Ok(())
    }

    /// Reactivates the open conversation on the server and mirrors the
    /// status locally.
    ///
    /// # Errors
    ///
    /// [`ViewerError::NoConversation`] when nothing is open, otherwise
    /// the underlying client error.
    pub async fn activate(&self) -> Result<(), ViewerError> {
        let id = self.open_conversation_id().await?;
        self.client.chat().activate(&id).await?;
        self.set_status("active").await;
        info!(conversation = %id, "conversation reactivated");
        Ok(())
    }

    /// Closes the open conversation on the server and mirrors the status
    /// locally. The view itself stays open.
    ///
    /// # Errors
    ///
    /// [`ViewerError::NoConversation`] when nothing is open, otherwise
    /// the underlying client error.
    pub async fn close_conversation(&self) -> Result<(), ViewerError> {
        let id = self.open_conversation_id().await?;
        self.client.chat().close(&id).await?;
        self.set_status("closed").await;
        info!(conversation = %id, "conversation closed");
        Ok(())
    }

    /// Snapshot of the open conversation, messages included.
    pub async fn conversation(&self) -> Option<ConversationDetail> {
        self.state.read().await.clone()
    }

    /// Snapshot of the open conversation's messages.
    pub async fn messages(&self) -> Vec<Message> {
        self.state
            .read()
            .await
            .as_ref()
            .map(|detail| detail.messages.clone())
            .unwrap_or_default()
    }

    async fn open_conversation_id(&self) -> Result<String, ViewerError> {
        self.state
            .read()
            .await
            .as_ref()
            .map(|detail| detail.conversation.id.clone())
            .ok_or(ViewerError::NoConversation)
    }

    async fn sender_id(&self) -> String {
        self.client
            .tokens()
            .current_user()
            .await
            .map(|user| user.id)
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| FALLBACK_SENDER.to_owned())
    }

    async fn set_status(&self, status: &str) {
        if let Some(detail) = self.state.write().await.as_mut() {
            detail.conversation.status = status.to_owned();
        }
    }

    async fn flag_read(&self, message_id: &str) {
        if let Some(detail) = self.state.write().await.as_mut()
            && let Some(message) = detail.messages.iter_mut().find(|m| m.id == message_id)
        {
            message.is_read = true;
        }
    }

    async fn mark_customer_messages_read(&self, detail: &mut ConversationDetail) {
        let unread: Vec<String> = detail
            .unread_from_customer()
            .map(|message| message.id.clone())
            .collect();
        for id in &unread {
            match self.client.chat().mark_read(id).await {
                Ok(()) => {
                    if let Some(message) = detail.messages.iter_mut().find(|m| m.id == *id) {
                        message.is_read = true;
                    }
                }
                Err(error) => warn!(%error, message = %id, "failed to mark message read"),
            }
        }
    }

    fn start_polling(&self) {
        let client = Arc::clone(&self.client);
        let state = Arc::clone(&self.state);
        let period = client.config().poll_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick fires immediately; skip it so the detail
            // fetch that just completed is not repeated.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                poll_once(&client, &state).await;
            }
        });

        *self.poller_slot() = Some(handle);
        debug!("message polling started");
    }

    fn stop_polling(&self) {
        if let Some(handle) = self.poller_slot().take() {
            handle.abort();
            debug!("message polling stopped");
        }
    }

    fn poller_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.poller.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ChatViewer {
    fn drop(&mut self) {
        self.stop_polling();
    }
}

/// One poll cycle: fetch messages after the local tail and append them.
///
/// Quietly does nothing when no conversation is open or its history is
/// empty, since there is no cursor to poll from. Errors are logged and
/// swallowed.
async fn poll_once(client: &ApiClient, state: &RwLock<Option<ConversationDetail>>) {
    let cursor = {
        let guard = state.read().await;
        guard.as_ref().and_then(|detail| {
            detail
                .last_message_id()
                .map(|last| (detail.conversation.id.clone(), last.to_owned()))
        })
    };
    let Some((conversation_id, last_id)) = cursor else {
        debug!("skipping poll, no conversation or empty history");
        return;
    };

    match client.chat().messages_after(&conversation_id, &last_id).await {
        Ok(batch) if batch.is_empty() => {}
        Ok(batch) => {
            let mut guard = state.write().await;
            // The view may have moved to another conversation mid-fetch.
            if let Some(detail) = guard.as_mut()
                && detail.conversation.id == conversation_id
            {
                debug!(count = batch.len(), "appending polled messages");
                detail.messages.extend(batch);
            }
        }
        Err(error) => {
            warn!(%error, conversation = %conversation_id, "message poll failed");
        }
    }
}
