//! Query parameter model for the accounts endpoint.
//!
//! `QueryParams` is the canonical, server-bound shape of one accounts query.
//! Optional filters are plain `Option`s: a filter that is `None` never
//! reaches the wire.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Page sizes offered by the paging control.
pub const ALLOWED_PAGE_SIZES: [u32; 5] = [5, 10, 25, 50, 100];

/// Number of rows per page, restricted to [`ALLOWED_PAGE_SIZES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PageSize(u32);

impl PageSize {
    pub const DEFAULT: PageSize = PageSize(25);

    /// Returns `None` when `size` is not one of the allowed sizes.
    pub fn new(size: u32) -> Option<Self> {
        ALLOWED_PAGE_SIZES
            .contains(&size)
            .then_some(PageSize(size))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for PageSize {
    type Error = String;

    fn try_from(size: u32) -> Result<Self, Self::Error> {
        PageSize::new(size).ok_or_else(|| {
            format!(
                "Invalid page size {}: expected one of {:?}",
                size, ALLOWED_PAGE_SIZES
            )
        })
    }
}

impl From<PageSize> for u32 {
    fn from(size: PageSize) -> Self {
        size.0
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-known sortable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    AccountLabel,
    NotificationsBilled,
    NotificationsSent,
    MessagesProcessed,
    TotalRecords,
    AutomationCount,
}

impl SortField {
    pub const ALL: [SortField; 6] = [
        SortField::AccountLabel,
        SortField::NotificationsBilled,
        SortField::NotificationsSent,
        SortField::MessagesProcessed,
        SortField::TotalRecords,
        SortField::AutomationCount,
    ];

    /// Wire name sent as `sort_by`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::AccountLabel => "account_label",
            SortField::NotificationsBilled => "notifications_billed",
            SortField::NotificationsSent => "notifications_sent",
            SortField::MessagesProcessed => "messages_processed",
            SortField::TotalRecords => "total_records",
            SortField::AutomationCount => "automation_count",
        }
    }

    /// Map a table column name onto a sortable field.
    ///
    /// Accepts the explorer's column ids (`records`, `messages`, ...) as well
    /// as the wire names. Returns `None` for columns the server cannot sort
    /// by, e.g. `subscription_status` or `seats`.
    pub fn from_column(column: &str) -> Option<Self> {
        match column.trim() {
            "account_label" | "label" => Some(SortField::AccountLabel),
            "records" | "total_records" => Some(SortField::TotalRecords),
            "automations" | "automation_count" => Some(SortField::AutomationCount),
            "messages" | "messages_processed" => Some(SortField::MessagesProcessed),
            "notifications" | "notifications_sent" => Some(SortField::NotificationsSent),
            "billed" | "notifications_billed" => Some(SortField::NotificationsBilled),
            _ => None,
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }

    /// Parse a sort-control direction. Empty means "no direction" and
    /// yields `None`, as does anything unrecognised.
    pub fn parse_gesture(direction: &str) -> Option<Self> {
        match direction.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Some(SortDirection::Ascending),
            "desc" | "descending" => Some(SortDirection::Descending),
            _ => None,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscription status values the server filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Inactive,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Inactive => "inactive",
        }
    }
}

/// Status filter control value: a concrete status or the `all` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(AccountStatus),
}

impl StatusFilter {
    pub fn status(&self) -> Option<AccountStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Only(status) => Some(*status),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Only(AccountStatus::Active)),
            "inactive" => Ok(StatusFilter::Only(AccountStatus::Inactive)),
            other => Err(format!(
                "Unknown status '{}': expected active, inactive or all",
                other
            )),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("all"),
            StatusFilter::Only(status) => f.write_str(status.as_str()),
        }
    }
}

/// One assembled accounts query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QueryParams {
    pub page: u32,
    pub page_size: PageSize,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AccountStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_title: Option<String>,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: PageSize::DEFAULT,
            sort_field: SortField::default(),
            sort_direction: SortDirection::default(),
            account_uuid: None,
            status: None,
            search: None,
            workflow_title: None,
        }
    }
}

impl QueryParams {
    /// Query-string pairs in wire order. Absent filters produce no pair.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
            ("sort_by", self.sort_field.as_str().to_string()),
            ("sort_dir", self.sort_direction.as_str().to_string()),
        ];

        if let Some(uuid) = &self.account_uuid {
            pairs.push(("account_uuid", uuid.clone()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(title) = &self.workflow_title {
            pairs.push(("workflow_title", title.clone()));
        }

        pairs
    }

    pub fn has_filters(&self) -> bool {
        self.account_uuid.is_some()
            || self.status.is_some()
            || self.search.is_some()
            || self.workflow_title.is_some()
    }
}
