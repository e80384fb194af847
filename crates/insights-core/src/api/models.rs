use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Success envelope wrapped around every JSON body the insights server returns.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: bool,
    pub data: T,
}

/// Error envelope: `{"status": false, "data": null, "error": {...}}`.
///
/// `detail` is the bare FastAPI shape, only consulted when `error` is absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorEnvelope {
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
    #[serde(default)]
    pub detail: Option<ErrorDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(default)]
    pub details: Option<ErrorDetails>,
}

/// Structured detail attached to a rejected request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetails {
    /// Request validation errors, one per offending field
    Fields(Vec<FieldError>),
    /// CSV header report produced by the ingestion endpoint
    CsvHeaders(CsvHeaderReport),
    /// Plain message
    Message(String),
    /// Any other JSON payload, passed through untouched
    Other(serde_json::Value),
}

impl ErrorDetails {
    /// Flatten the detail into a single line for status messages.
    pub fn summary(&self) -> String {
        match self {
            ErrorDetails::Fields(fields) => fields
                .iter()
                .map(|f| f.msg.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            ErrorDetails::CsvHeaders(report) => report.message.clone(),
            ErrorDetails::Message(msg) => msg.clone(),
            ErrorDetails::Other(value) => value.to_string(),
        }
    }
}

/// A single field validation failure (`loc` is the path to the field).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub loc: Vec<serde_json::Value>,
    pub msg: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl FieldError {
    /// Dotted field path, e.g. `query.page_size`.
    pub fn path(&self) -> String {
        self.loc
            .iter()
            .map(|part| match part {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvHeaderReport {
    pub message: String,
    #[serde(default)]
    pub expected: Vec<String>,
    #[serde(default)]
    pub missing: Vec<String>,
    #[serde(default)]
    pub extra: Vec<String>,
    #[serde(default)]
    pub headers_present: Vec<String>,
}

// === Accounts ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub status: String,
    pub admin_seats: u32,
    pub user_seats: u32,
    pub read_only_seats: u32,
}

impl Subscription {
    pub fn total_seats(&self) -> u32 {
        self.admin_seats + self.user_seats + self.read_only_seats
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub total_records: u64,
    pub automation_count: u64,
    pub messages_processed: u64,
    pub notifications_sent: u64,
    pub notifications_billed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflows {
    pub count: u32,
    pub titles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account_uuid: String,
    pub account_label: String,
    pub subscription: Subscription,
    pub usage: Usage,
    pub workflows: Workflows,
}

/// One server-side page of account records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountsPage {
    pub page: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u32,
    pub items: Vec<AccountRecord>,
}

// === Summary ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    #[default]
    Leadership,
    AccountManager,
}

impl Audience {
    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::Leadership => "leadership",
            Audience::AccountManager => "account_manager",
        }
    }
}

impl std::str::FromStr for Audience {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "leadership" => Ok(Audience::Leadership),
            "account_manager" => Ok(Audience::AccountManager),
            other => Err(format!(
                "Unknown audience '{}': expected leadership or account_manager",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadershipAnalytics {
    pub accounts_total: u64,
    pub accounts_active: u64,
    pub accounts_inactive: u64,
    pub workflows_total: u64,
    pub workflow_titles_unique: u64,
    pub automation_count_total: u64,
    pub messages_processed_total: u64,
    pub notifications_sent_total: u64,
    pub notifications_billed_total: u64,
    pub notifications_billed_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadershipSummary {
    pub analytics: LeadershipAnalytics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountManagerAnalytics {
    pub accounts_total: u64,
    pub inactive_with_usage_count: u64,
    pub active_zero_activity_count: u64,
    pub seats_vs_usage_mismatch_count: u64,
    pub billed_vs_sent_anomalies_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRef {
    pub account_uuid: String,
    pub account_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionList {
    pub reason: String,
    pub recommended_actions: Vec<String>,
    pub items: Vec<AccountRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountManagerActionLists {
    pub inactive_with_usage: ActionList,
    pub active_zero_activity: ActionList,
    pub seats_vs_usage_mismatch: ActionList,
    pub billed_vs_sent_anomalies: ActionList,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountManagerSummary {
    pub analytics: AccountManagerAnalytics,
    pub action_lists: AccountManagerActionLists,
    #[serde(default)]
    pub notes: Option<Vec<String>>,
}

/// Dashboard summary; the shape depends on the requested audience.
///
/// Account-manager is tried first since its `action_lists` key is what
/// tells the two shapes apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Summary {
    AccountManager(AccountManagerSummary),
    Leadership(LeadershipSummary),
}

// === Analytics ===

/// Label/value series returned by every chart endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartData {
    pub fn points(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatusUsage {
    pub accounts: u64,
    pub automation_count_total: u64,
    pub messages_processed_total: u64,
    pub notifications_sent_total: u64,
    pub notifications_billed_total: u64,
    pub total_records_total: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UsageByStatus {
    pub active: StatusUsage,
    pub inactive: StatusUsage,
}

impl UsageByStatus {
    pub fn total_accounts(&self) -> u64 {
        self.active.accounts + self.inactive.accounts
    }

    pub fn total_messages(&self) -> u64 {
        self.active.messages_processed_total + self.inactive.messages_processed_total
    }

    pub fn total_notifications(&self) -> u64 {
        self.active.notifications_sent_total + self.inactive.notifications_sent_total
    }

    pub fn total_records(&self) -> u64 {
        self.active.total_records_total + self.inactive.total_records_total
    }
}

// === Ingestion & auth ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionResult {
    pub ok: bool,
    pub records_loaded: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub email: String,
}

impl TokenResponse {
    /// Expiry instant for a token issued at `issued_at`
    pub fn expires_at(&self, issued_at: DateTime<Utc>) -> DateTime<Utc> {
        issued_at + chrono::Duration::seconds(self.expires_in as i64)
    }
}
