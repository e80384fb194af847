//! Dashboard and analytics views.
//!
//! Both follow the explorer's request discipline without its inputs: every
//! load goes through a [`ResultMachine`], so a slow response can never
//! overwrite a newer one.

use crate::api::models::{Audience, ChartData, Summary, UsageByStatus};
use crate::core::query::{FetchFailure, RequestId, ResultMachine, ResultState, Settlement};
use crate::core::services::traits::{AnalyticsSource, SummarySource};
use crate::error::ApiError;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

pub const DEFAULT_TOP_WORKFLOWS: u32 = 10;

/// Result machine plus the completion channel its fetches report on
struct Loader<T> {
    subject: &'static str,
    machine: ResultMachine<T>,
    tx: mpsc::UnboundedSender<(RequestId, Result<T, FetchFailure>)>,
    rx: mpsc::UnboundedReceiver<(RequestId, Result<T, FetchFailure>)>,
}

impl<T: Clone + Send + 'static> Loader<T> {
    fn new(subject: &'static str) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            subject,
            machine: ResultMachine::new(),
            tx,
            rx,
        }
    }

    fn dispatch<F>(&mut self, fetch: F) -> RequestId
    where
        F: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let id = self.machine.begin();
        let subject = self.subject;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = fetch
                .await
                .map_err(|e| FetchFailure::from_api_error(&e, subject));
            let _ = tx.send((id, result));
        });
        id
    }

    async fn next_settlement(&mut self) -> Option<(RequestId, Settlement)> {
        let (id, result) = self.rx.recv().await?;
        Some((id, self.machine.settle(id, result)))
    }
}

/// Audience-specific summary page
pub struct DashboardView<S> {
    source: Arc<S>,
    audience: Audience,
    loader: Loader<Summary>,
}

impl<S: SummarySource + 'static> DashboardView<S> {
    pub fn new(source: Arc<S>, audience: Audience) -> Self {
        Self {
            source,
            audience,
            loader: Loader::new("summary"),
        }
    }

    pub fn audience(&self) -> Audience {
        self.audience
    }

    pub fn subscribe(&self) -> watch::Receiver<ResultState<Summary>> {
        self.loader.machine.subscribe()
    }

    pub fn state(&self) -> ResultState<Summary> {
        self.loader.machine.state()
    }

    pub fn start(&mut self) -> RequestId {
        self.dispatch()
    }

    /// Switch audience. Selecting the current audience again is a no-op.
    pub fn on_audience_change(&mut self, audience: Audience) -> Option<RequestId> {
        if audience == self.audience {
            return None;
        }
        self.audience = audience;
        Some(self.dispatch())
    }

    pub fn reload(&mut self) -> RequestId {
        self.dispatch()
    }

    /// Wait for the next fetch to finish and apply it.
    pub async fn next_settlement(&mut self) -> Option<(RequestId, Settlement)> {
        self.loader.next_settlement().await
    }

    fn dispatch(&mut self) -> RequestId {
        let source = Arc::clone(&self.source);
        let audience = self.audience;
        log::debug!("Fetching {} summary", audience.as_str());
        self.loader
            .dispatch(async move { source.fetch_summary(audience).await })
    }
}

/// Everything the analytics page shows, loaded as one unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsData {
    pub subscriptions_by_status: ChartData,
    pub notifications_sent_vs_billed: ChartData,
    pub top_workflows: ChartData,
    pub usage_by_status: UsageByStatus,
}

impl AnalyticsData {
    pub fn total_accounts(&self) -> u64 {
        self.usage_by_status.total_accounts()
    }

    pub fn total_messages(&self) -> u64 {
        self.usage_by_status.total_messages()
    }

    pub fn total_notifications(&self) -> u64 {
        self.usage_by_status.total_notifications()
    }

    pub fn total_records(&self) -> u64 {
        self.usage_by_status.total_records()
    }
}

pub struct AnalyticsView<S> {
    source: Arc<S>,
    top_limit: u32,
    loader: Loader<AnalyticsData>,
}

impl<S: AnalyticsSource + 'static> AnalyticsView<S> {
    pub fn new(source: Arc<S>, top_limit: u32) -> Self {
        Self {
            source,
            top_limit,
            loader: Loader::new("analytics"),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ResultState<AnalyticsData>> {
        self.loader.machine.subscribe()
    }

    pub fn state(&self) -> ResultState<AnalyticsData> {
        self.loader.machine.state()
    }

    /// Fetch all four series concurrently; any failure fails the load.
    pub fn load(&mut self) -> RequestId {
        let source = Arc::clone(&self.source);
        let limit = self.top_limit;
        self.loader.dispatch(async move {
            let (subscriptions_by_status, notifications_sent_vs_billed, top_workflows, usage_by_status) =
                futures::try_join!(
                    source.subscriptions_by_status(),
                    source.notifications_sent_vs_billed(),
                    source.top_workflows(limit),
                    source.usage_by_status(),
                )?;
            Ok::<_, ApiError>(AnalyticsData {
                subscriptions_by_status,
                notifications_sent_vs_billed,
                top_workflows,
                usage_by_status,
            })
        })
    }

    pub async fn next_settlement(&mut self) -> Option<(RequestId, Settlement)> {
        self.loader.next_settlement().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{LeadershipAnalytics, LeadershipSummary, StatusUsage};
    use crate::core::query::{FailureKind, Phase};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    #[derive(Default)]
    struct FakeSummaries {
        requested: Mutex<Vec<Audience>>,
    }

    fn leadership(total: u64) -> Summary {
        Summary::Leadership(LeadershipSummary {
            analytics: LeadershipAnalytics {
                accounts_total: total,
                accounts_active: total,
                accounts_inactive: 0,
                workflows_total: 0,
                workflow_titles_unique: 0,
                automation_count_total: 0,
                messages_processed_total: 0,
                notifications_sent_total: 0,
                notifications_billed_total: 0,
                notifications_billed_ratio: None,
            },
        })
    }

    #[async_trait]
    impl SummarySource for FakeSummaries {
        async fn fetch_summary(&self, audience: Audience) -> Result<Summary, ApiError> {
            self.requested.lock().unwrap().push(audience);
            Ok(leadership(3))
        }
    }

    /// Holds each audience's summary until the test releases it
    struct GatedSummaries {
        gates: Mutex<Vec<(Audience, oneshot::Receiver<Summary>)>>,
    }

    #[async_trait]
    impl SummarySource for GatedSummaries {
        async fn fetch_summary(&self, audience: Audience) -> Result<Summary, ApiError> {
            let gate = {
                let mut gates = self.gates.lock().unwrap();
                let index = gates.iter().position(|(a, _)| *a == audience);
                index.map(|i| gates.remove(i).1)
            };
            match gate {
                Some(rx) => rx.await.map_err(|e| ApiError::Network {
                    endpoint: "gate".to_string(),
                    message: e.to_string(),
                }),
                None => Ok(leadership(0)),
            }
        }
    }

    struct FakeAnalytics {
        fail_top: bool,
    }

    #[async_trait]
    impl AnalyticsSource for FakeAnalytics {
        async fn subscriptions_by_status(&self) -> Result<ChartData, ApiError> {
            Ok(ChartData {
                labels: vec!["active".to_string(), "inactive".to_string()],
                values: vec![8.0, 2.0],
            })
        }

        async fn notifications_sent_vs_billed(&self) -> Result<ChartData, ApiError> {
            Ok(ChartData {
                labels: vec!["sent".to_string(), "billed".to_string()],
                values: vec![100.0, 96.0],
            })
        }

        async fn top_workflows(&self, limit: u32) -> Result<ChartData, ApiError> {
            if self.fail_top {
                return Err(ApiError::Http {
                    status: 500,
                    endpoint: "/api/insights/analytics/workflows/top".to_string(),
                    message: "Internal Server Error".to_string(),
                });
            }
            Ok(ChartData {
                labels: vec!["Onboarding".to_string(); limit as usize],
                values: vec![1.0; limit as usize],
            })
        }

        async fn usage_by_status(&self) -> Result<UsageByStatus, ApiError> {
            Ok(UsageByStatus {
                active: StatusUsage {
                    accounts: 8,
                    messages_processed_total: 1_000,
                    total_records_total: 40,
                    ..StatusUsage::default()
                },
                inactive: StatusUsage {
                    accounts: 2,
                    messages_processed_total: 50,
                    total_records_total: 4,
                    ..StatusUsage::default()
                },
            })
        }
    }

    #[tokio::test]
    async fn test_dashboard_dispatches_only_on_audience_change() {
        let source = Arc::new(FakeSummaries::default());
        let mut view = DashboardView::new(Arc::clone(&source), Audience::default());

        let first = view.start();
        assert_eq!(view.next_settlement().await, Some((first, Settlement::Applied)));
        assert!(view.on_audience_change(Audience::Leadership).is_none());

        let second = view
            .on_audience_change(Audience::AccountManager)
            .expect("audience change dispatches");
        assert_eq!(view.next_settlement().await, Some((second, Settlement::Applied)));
        assert_eq!(view.audience(), Audience::AccountManager);

        let third = view.reload();
        view.next_settlement().await;
        assert_eq!(view.state().phase, Phase::Success);
        assert!(third > second);

        assert_eq!(
            *source.requested.lock().unwrap(),
            vec![
                Audience::Leadership,
                Audience::AccountManager,
                Audience::AccountManager
            ]
        );
    }

    #[tokio::test]
    async fn test_superseded_audience_load_is_dropped() {
        let (leadership_tx, leadership_rx) = oneshot::channel();
        let (manager_tx, manager_rx) = oneshot::channel();
        let source = Arc::new(GatedSummaries {
            gates: Mutex::new(vec![
                (Audience::Leadership, leadership_rx),
                (Audience::AccountManager, manager_rx),
            ]),
        });
        let mut view = DashboardView::new(source, Audience::Leadership);

        let first = view.start();
        let second = view
            .on_audience_change(Audience::AccountManager)
            .expect("audience change dispatches");

        manager_tx.send(leadership(7)).unwrap();
        assert_eq!(view.next_settlement().await, Some((second, Settlement::Applied)));

        leadership_tx.send(leadership(1)).unwrap();
        assert_eq!(view.next_settlement().await, Some((first, Settlement::Discarded)));

        let state = view.state();
        assert_eq!(state.phase, Phase::Success);
        assert_eq!(state.data, Some(leadership(7)));
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_analytics_loads_all_series() {
        let mut view = AnalyticsView::new(Arc::new(FakeAnalytics { fail_top: false }), 3);
        let id = view.load();
        assert!(view.state().is_loading);
        assert_eq!(view.next_settlement().await, Some((id, Settlement::Applied)));

        let data = view.state().data.expect("analytics loaded");
        assert_eq!(data.top_workflows.labels.len(), 3);
        assert_eq!(data.total_accounts(), 10);
        assert_eq!(data.total_messages(), 1_050);
        assert_eq!(data.total_records(), 44);
    }

    #[tokio::test]
    async fn test_analytics_single_failure_fails_load() {
        let mut view = AnalyticsView::new(
            Arc::new(FakeAnalytics { fail_top: true }),
            DEFAULT_TOP_WORKFLOWS,
        );
        view.load();
        view.next_settlement().await;

        let state = view.state();
        assert_eq!(state.phase, Phase::Failure);
        assert!(state.data.is_none());
        assert_eq!(state.failure.map(|f| f.kind), Some(FailureKind::Server));
        assert_eq!(
            state.error.as_deref(),
            Some("Failed to load analytics: Internal Server Error")
        );
    }
}
