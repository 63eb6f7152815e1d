//! VNPay transaction listing.

use kennel_domain::{Transaction, TransactionStats};

use crate::client::ApiClient;
use crate::config::endpoints;
use crate::error::ClientResult;

/// Transaction operations.
pub struct TransactionsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> TransactionsApi<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Every transaction known to the gateway.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`ClientError`](crate::ClientError) when
    /// the request fails.
    pub async fn all(&self) -> ClientResult<Vec<Transaction>> {
        self.client.get(endpoints::TRANSACTIONS, None).await
    }

    /// Fetches every transaction and aggregates the revenue counters.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`ClientError`](crate::ClientError) when
    /// the request fails.
    pub async fn statistics(&self) -> ClientResult<TransactionStats> {
        Ok(TransactionStats::summarize(&self.all().await?))
    }
}
