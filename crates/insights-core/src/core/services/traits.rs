//! Data sources the views fetch from.
//!
//! [`InsightsClient`] implements all of them; tests substitute in-memory
//! sources to control timing and failures.

use crate::api::client::InsightsClient;
use crate::api::models::{AccountsPage, Audience, ChartData, Summary, UsageByStatus};
use crate::core::query::QueryParams;
use crate::error::ApiError;
use async_trait::async_trait;

/// Paged, filtered account listing
#[async_trait]
pub trait AccountSource: Send + Sync {
    async fn fetch_page(&self, query: &QueryParams) -> Result<AccountsPage, ApiError>;
}

/// Audience-specific dashboard summary
#[async_trait]
pub trait SummarySource: Send + Sync {
    async fn fetch_summary(&self, audience: Audience) -> Result<Summary, ApiError>;
}

/// Chart series for the analytics view
#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    async fn subscriptions_by_status(&self) -> Result<ChartData, ApiError>;
    async fn notifications_sent_vs_billed(&self) -> Result<ChartData, ApiError>;
    async fn top_workflows(&self, limit: u32) -> Result<ChartData, ApiError>;
    async fn usage_by_status(&self) -> Result<UsageByStatus, ApiError>;
}

#[async_trait]
impl AccountSource for InsightsClient {
    async fn fetch_page(&self, query: &QueryParams) -> Result<AccountsPage, ApiError> {
        self.list_accounts(query).await
    }
}

#[async_trait]
impl SummarySource for InsightsClient {
    async fn fetch_summary(&self, audience: Audience) -> Result<Summary, ApiError> {
        self.get_summary(audience).await
    }
}

#[async_trait]
impl AnalyticsSource for InsightsClient {
    async fn subscriptions_by_status(&self) -> Result<ChartData, ApiError> {
        InsightsClient::subscriptions_by_status(self).await
    }

    async fn notifications_sent_vs_billed(&self) -> Result<ChartData, ApiError> {
        InsightsClient::notifications_sent_vs_billed(self).await
    }

    async fn top_workflows(&self, limit: u32) -> Result<ChartData, ApiError> {
        InsightsClient::top_workflows(self, limit).await
    }

    async fn usage_by_status(&self) -> Result<UsageByStatus, ApiError> {
        self.usage_by_subscription_status().await
    }
}
