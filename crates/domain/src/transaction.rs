//! Payment transaction types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A VNPay transaction row.
///
/// Amounts are integer VND; `payment_status` is the gateway's free-form
/// string with `success`, `pending` and `failed` as the well-known values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Server-issued transaction id.
    pub id: String,
    /// Customer who paid.
    #[serde(default)]
    pub user_id: String,
    /// Order the payment belongs to.
    #[serde(default)]
    pub order_id: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Amount in VND.
    #[serde(default)]
    pub money: i64,
    /// When the transaction was created.
    pub created_date: DateTime<Utc>,
    /// Free-form payment status.
    #[serde(default)]
    pub payment_status: String,
}

impl Transaction {
    /// Whether the payment completed.
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.payment_status.eq_ignore_ascii_case("success")
    }

    /// Whether the payment is still pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.payment_status.eq_ignore_ascii_case("pending")
    }

    /// Whether the payment failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.payment_status.eq_ignore_ascii_case("failed")
    }
}

/// Aggregates over a transaction listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransactionStats {
    /// Number of transactions.
    pub total: u64,
    /// Transactions with status `success`.
    pub successful: u64,
    /// Transactions with status `pending`.
    pub pending: u64,
    /// Transactions with status `failed`.
    pub failed: u64,
    /// Sum of successful amounts, in VND.
    pub total_income: i64,
    /// Sum of failed amounts, in VND.
    pub total_expense: i64,
    /// Income minus expense, in VND.
    pub net_balance: i64,
}

impl TransactionStats {
    /// Computes the aggregates over a listing.
    #[must_use]
    pub fn summarize(transactions: &[Transaction]) -> Self {
        let total_income: i64 = transactions
            .iter()
            .filter(|t| t.is_successful())
            .map(|t| t.money)
            .sum();
        let total_expense: i64 = transactions
            .iter()
            .filter(|t| t.is_failed())
            .map(|t| t.money)
            .sum();

        Self {
            total: transactions.len() as u64,
            successful: transactions.iter().filter(|t| t.is_successful()).count() as u64,
            pending: transactions.iter().filter(|t| t.is_pending()).count() as u64,
            failed: transactions.iter().filter(|t| t.is_failed()).count() as u64,
            total_income,
            total_expense,
            net_balance: total_income - total_expense,
        }
    }
}
