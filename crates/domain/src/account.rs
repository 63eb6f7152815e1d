//! Customer account types for the admin listing.

use serde::{Deserialize, Serialize};

/// A customer account row as returned by `GET /api/account`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Server-issued account id.
    pub id: String,
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Display name.
    #[serde(default)]
    pub full_name: String,
    /// Optional gender string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Optional avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,
    /// Whether the account is enabled.
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Free-form account status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Registration workflow status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register_status: Option<String>,
    /// Role assigned to the account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

const fn default_active() -> bool {
    true
}

/// Sort direction for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

/// Query parameters accepted by the account listing endpoint.
///
/// Serializes to the gateway's `page`/`limit`/`search`/`sortBy`/`sortOrder`
/// query names; `search` is omitted entirely when empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountQuery {
    /// 1-based page number.
    pub page: u32,
    /// Rows per page.
    pub limit: u32,
    /// Free-text filter over name/email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Field to sort by.
    pub sort_by: String,
    /// Sort direction.
    pub sort_order: SortOrder,
}

impl Default for AccountQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 50,
            search: None,
            sort_by: "createdAt".to_owned(),
            sort_order: SortOrder::Desc,
        }
    }
}

impl AccountQuery {
    /// Query for the given page with default size and ordering.
    #[must_use]
    pub fn page(page: u32) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    /// Sets the page size.
    #[must_use]
    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the free-text filter; blank input clears it.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = if search.trim().is_empty() {
            None
        } else {
            Some(search)
        };
        self
    }

    /// Sets the sort field and direction.
    #[must_use]
    pub fn sorted_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = field.into();
        self.sort_order = order;
        self
    }
}
