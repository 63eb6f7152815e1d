//! Customer account listing.

use kennel_domain::{Account, AccountQuery, Page, PageEnvelope};

use crate::client::ApiClient;
use crate::config::endpoints;
use crate::error::{ClientError, ClientResult};

/// Customer account operations.
pub struct AccountsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AccountsApi<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Lists customer accounts, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`ClientError`] when the request fails.
    pub async fn list(&self, query: &AccountQuery) -> ClientResult<Page<Account>> {
        let encoded =
            serde_urlencoded::to_string(query).map_err(|e| ClientError::InvalidBody(e.to_string()))?;
        let envelope: PageEnvelope<Account> =
            self.client.get(endpoints::ACCOUNTS, Some(encoded)).await?;
        Ok(envelope.into_page(query.page))
    }
}
