//! Accounts explorer: the coordinating view behind the accounts table.
//!
//! One explorer owns its inputs, cursor and result machine. Handlers take
//! `&mut self` and run on the caller's task; fetches run as spawned tokio
//! tasks and report back over a channel that [`AccountsExplorer::next_event`]
//! drains, together with the debounce deadlines of the free-text inputs.
//!
//! ```rust,ignore
//! let mut explorer = AccountsExplorer::new(Arc::new(client), ExplorerOptions::default());
//! explorer.start();
//! explorer.set_search("acme");
//! loop {
//!     if let ExplorerEvent::Settled { .. } = explorer.next_event().await {
//!         render(&explorer.state());
//!     }
//! }
//! ```

use crate::api::models::AccountsPage;
use crate::core::query::{
    Cursor, DEFAULT_QUIET_PERIOD, Debouncer, FetchFailure, FilterInputs, PageSize, QueryParams,
    RequestId, ResultMachine, ResultState, Settlement, SortDirection, SortOutcome, StatusFilter,
    assemble,
};
use crate::core::services::traits::AccountSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until};

type Completion = (RequestId, Result<AccountsPage, FetchFailure>);

#[derive(Debug, Clone)]
pub struct ExplorerOptions {
    /// Quiet period for search, identifier and workflow inputs
    pub quiet_period: Duration,
    pub page_size: PageSize,
    /// Account identifier injected from outside, applied once at start
    pub deep_link_account: Option<String>,
}

impl Default for ExplorerOptions {
    fn default() -> Self {
        Self {
            quiet_period: DEFAULT_QUIET_PERIOD,
            page_size: PageSize::DEFAULT,
            deep_link_account: None,
        }
    }
}

/// Something the explorer did while waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplorerEvent {
    /// A debounced input settled and a new request went out
    Dispatched(RequestId),
    /// A fetch finished; `settlement` says whether it reached the state
    Settled {
        id: RequestId,
        settlement: Settlement,
    },
}

pub struct AccountsExplorer<S> {
    source: Arc<S>,
    search: Debouncer<String>,
    account: Debouncer<String>,
    workflow: Debouncer<String>,
    status: StatusFilter,
    cursor: Cursor,
    machine: ResultMachine<AccountsPage>,
    deep_link: Option<String>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl<S: AccountSource + 'static> AccountsExplorer<S> {
    pub fn new(source: Arc<S>, options: ExplorerOptions) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            source,
            search: Debouncer::new(String::new(), options.quiet_period),
            account: Debouncer::new(String::new(), options.quiet_period),
            workflow: Debouncer::new(String::new(), options.quiet_period),
            status: StatusFilter::All,
            cursor: Cursor::with_page_size(options.page_size),
            machine: ResultMachine::new(),
            deep_link: options.deep_link_account,
            completions_tx,
            completions_rx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ResultState<AccountsPage>> {
        self.machine.subscribe()
    }

    pub fn state(&self) -> ResultState<AccountsPage> {
        self.machine.state()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Settled filter values, as the next request would see them
    pub fn filters(&self) -> FilterInputs {
        FilterInputs {
            account_uuid: self.account.value().clone(),
            search: self.search.value().clone(),
            workflow_title: self.workflow.value().clone(),
            status: self.status,
        }
    }

    /// The query the next dispatch would send
    pub fn current_query(&self) -> QueryParams {
        assemble(&self.filters(), &self.cursor)
    }

    /// Apply the deep link, if any, and load the first page.
    pub fn start(&mut self) -> RequestId {
        if let Some(uuid) = self.deep_link.take() {
            log::debug!("Seeding account filter from deep link: {}", uuid);
            self.account.reset(uuid);
        }
        self.dispatch()
    }

    pub fn set_search(&mut self, text: &str) {
        self.search.push(text.to_string(), Instant::now());
    }

    pub fn set_identifier_filter(&mut self, uuid: &str) {
        self.account.push(uuid.to_string(), Instant::now());
    }

    pub fn set_workflow_filter(&mut self, title: &str) {
        self.workflow.push(title.to_string(), Instant::now());
    }

    /// Status is categorical: applied immediately, ignored when unchanged.
    pub fn set_status_filter(&mut self, status: StatusFilter) -> Option<RequestId> {
        if status == self.status {
            return None;
        }
        self.status = status;
        self.cursor.on_filter_change();
        Some(self.dispatch())
    }

    /// Column-header sort gesture. `None` means the gesture carried no
    /// direction, which leaves everything untouched.
    pub fn on_sort(&mut self, column: &str, direction: Option<SortDirection>) -> Option<RequestId> {
        match self.cursor.apply_sort(column, direction) {
            SortOutcome::Ignored => None,
            SortOutcome::Applied { field, fell_back } => {
                if fell_back {
                    log::debug!("Column '{}' is not sortable, using {}", column, field);
                }
                Some(self.dispatch())
            }
        }
    }

    /// Paging control moved to `index` (0-based) with `size` rows per page.
    pub fn on_page_change(&mut self, index: u32, size: u32) -> RequestId {
        self.cursor.navigate(index, size);
        self.dispatch()
    }

    /// Reset every filter and return to page 1. Page size and sort are kept.
    pub fn clear_filters(&mut self) -> RequestId {
        self.search.reset(String::new());
        self.account.reset(String::new());
        self.workflow.reset(String::new());
        self.status = StatusFilter::All;
        self.deep_link = None;
        self.cursor.on_clear();
        self.dispatch()
    }

    /// Re-issue the current query.
    pub fn reload(&mut self) -> RequestId {
        self.dispatch()
    }

    /// Earliest armed debounce deadline, if any input is pending
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.search.deadline(),
            self.account.deadline(),
            self.workflow.deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Forward every input whose quiet period has passed. Dispatches at
    /// most once, however many inputs settled together, and not at all when
    /// the settled text assembles to the query already sent (e.g. only
    /// surrounding whitespace changed).
    pub fn poll_debounce(&mut self, now: Instant) -> Option<RequestId> {
        let before = assemble(&self.filters(), &self.cursor);
        let mut changed = false;
        for input in [&mut self.search, &mut self.account, &mut self.workflow] {
            if let Some(value) = input.poll(now) {
                log::trace!("Input settled on {:?}", value);
                changed = true;
            }
        }

        if !changed || assemble(&self.filters(), &self.cursor) == before {
            return None;
        }
        self.cursor.on_filter_change();
        Some(self.dispatch())
    }

    /// Apply a finished fetch. Superseded results are dropped.
    pub fn settle(&mut self, id: RequestId, result: Result<AccountsPage, FetchFailure>) -> Settlement {
        self.machine.settle(id, result)
    }

    /// Wait for the next fetch completion or debounce deadline and act on it.
    ///
    /// Must be polled for debounced inputs to ever reach the server.
    pub async fn next_event(&mut self) -> ExplorerEvent {
        loop {
            let deadline = self.next_deadline();
            tokio::select! {
                Some((id, result)) = self.completions_rx.recv() => {
                    let settlement = self.machine.settle(id, result);
                    return ExplorerEvent::Settled { id, settlement };
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some(id) = self.poll_debounce(Instant::now()) {
                        return ExplorerEvent::Dispatched(id);
                    }
                }
            }
        }
    }

    fn dispatch(&mut self) -> RequestId {
        let query = self.current_query();
        let id = self.machine.begin();
        log::debug!("Fetching accounts {}: {:?}", id, query.to_query_pairs());

        let source = Arc::clone(&self.source);
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = source
                .fetch_page(&query)
                .await
                .map_err(|e| FetchFailure::from_api_error(&e, "accounts"));
            let _ = tx.send((id, result));
        });

        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query::{AccountStatus, Phase, SortField};
    use crate::error::ApiError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    fn page_for(query: &QueryParams) -> AccountsPage {
        AccountsPage {
            page: query.page,
            page_size: query.page_size.get(),
            total_items: 0,
            total_pages: 0,
            items: vec![],
        }
    }

    /// Answers immediately and remembers every query it saw
    #[derive(Default)]
    struct RecordingSource {
        queries: Mutex<Vec<QueryParams>>,
        fail_with_status: Mutex<Option<u16>>,
    }

    impl RecordingSource {
        fn queries(&self) -> Vec<QueryParams> {
            self.queries.lock().unwrap().clone()
        }

        fn last_query(&self) -> QueryParams {
            self.queries().last().cloned().expect("no query recorded")
        }

        fn fail_next_with(&self, status: u16) {
            *self.fail_with_status.lock().unwrap() = Some(status);
        }
    }

    #[async_trait]
    impl AccountSource for RecordingSource {
        async fn fetch_page(&self, query: &QueryParams) -> Result<AccountsPage, ApiError> {
            self.queries.lock().unwrap().push(query.clone());
            match self.fail_with_status.lock().unwrap().take() {
                Some(401) => Err(ApiError::Unauthorized {
                    status: 401,
                    endpoint: "/api/insights/accounts".to_string(),
                    server_message: "Token expired".to_string(),
                }),
                Some(status) => Err(ApiError::Http {
                    status,
                    endpoint: "/api/insights/accounts".to_string(),
                    message: "boom".to_string(),
                }),
                None => Ok(page_for(query)),
            }
        }
    }

    /// Holds each page's response until the test releases it
    struct GatedSource {
        gates: Mutex<HashMap<u32, oneshot::Receiver<AccountsPage>>>,
    }

    #[async_trait]
    impl AccountSource for GatedSource {
        async fn fetch_page(&self, query: &QueryParams) -> Result<AccountsPage, ApiError> {
            let gate = self.gates.lock().unwrap().remove(&query.page);
            match gate {
                Some(rx) => rx.await.map_err(|e| ApiError::Network {
                    endpoint: "gate".to_string(),
                    message: e.to_string(),
                }),
                None => Ok(page_for(query)),
            }
        }
    }

    fn explorer(source: &Arc<RecordingSource>) -> AccountsExplorer<RecordingSource> {
        AccountsExplorer::new(Arc::clone(source), ExplorerOptions::default())
    }

    async fn next_settlement<S: AccountSource + 'static>(
        explorer: &mut AccountsExplorer<S>,
    ) -> (RequestId, Settlement) {
        loop {
            if let ExplorerEvent::Settled { id, settlement } = explorer.next_event().await {
                return (id, settlement);
            }
        }
    }

    /// Drain completions until request `id` settles
    async fn settle_through<S: AccountSource + 'static>(
        explorer: &mut AccountsExplorer<S>,
        id: RequestId,
    ) -> Settlement {
        loop {
            match explorer.next_event().await {
                ExplorerEvent::Settled {
                    id: settled,
                    settlement,
                } if settled == id => return settlement,
                _ => {}
            }
        }
    }

    #[tokio::test]
    async fn test_start_loads_first_page() {
        let source = Arc::new(RecordingSource::default());
        let mut explorer = explorer(&source);

        let id = explorer.start();
        assert!(explorer.state().is_loading);
        assert_eq!(next_settlement(&mut explorer).await, (id, Settlement::Applied));

        let state = explorer.state();
        assert_eq!(state.phase, Phase::Success);
        assert!(!state.is_loading);
        assert_eq!(source.last_query(), QueryParams::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_dispatches_after_quiet_period() {
        let source = Arc::new(RecordingSource::default());
        let mut explorer = explorer(&source);
        explorer.start();
        next_settlement(&mut explorer).await;

        let typed_at = Instant::now();
        explorer.set_search("acme");
        let event = explorer.next_event().await;
        assert!(matches!(event, ExplorerEvent::Dispatched(_)));
        assert!(typed_at.elapsed() >= DEFAULT_QUIET_PERIOD);
        next_settlement(&mut explorer).await;

        assert_eq!(
            source.last_query(),
            QueryParams {
                search: Some("acme".to_string()),
                ..QueryParams::default()
            }
        );
        let keys: Vec<&str> = source
            .last_query()
            .to_query_pairs()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["page", "page_size", "sort_by", "sort_dir", "search"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keystrokes_within_quiet_period_send_one_request() {
        let source = Arc::new(RecordingSource::default());
        let mut explorer = explorer(&source);
        explorer.start();
        next_settlement(&mut explorer).await;

        explorer.set_search("a");
        tokio::time::advance(Duration::from_millis(200)).await;
        explorer.set_search("ac");
        tokio::time::advance(Duration::from_millis(200)).await;
        explorer.set_search("acm");

        let early = tokio::time::timeout(Duration::from_millis(250), explorer.next_event()).await;
        assert!(early.is_err(), "dispatched before the quiet period");

        assert!(matches!(
            explorer.next_event().await,
            ExplorerEvent::Dispatched(_)
        ));
        next_settlement(&mut explorer).await;

        let queries = source.queries();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[1].search.as_deref(), Some("acm"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retyping_same_text_does_not_dispatch() {
        let source = Arc::new(RecordingSource::default());
        let mut explorer = explorer(&source);
        explorer.start();
        next_settlement(&mut explorer).await;

        explorer.set_search("acme");
        next_settlement(&mut explorer).await;

        explorer.set_search("acm");
        explorer.set_search("acme");
        let idle = tokio::time::timeout(Duration::from_secs(2), explorer.next_event()).await;
        assert!(idle.is_err());
        assert_eq!(source.queries().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_whitespace_only_edit_keeps_page_and_sends_nothing() {
        let source = Arc::new(RecordingSource::default());
        let mut explorer = explorer(&source);
        explorer.start();
        next_settlement(&mut explorer).await;

        explorer.set_search("acme");
        next_settlement(&mut explorer).await;
        let paged = explorer.on_page_change(4, 25);
        settle_through(&mut explorer, paged).await;
        assert_eq!(source.queries().len(), 3);

        explorer.set_search("acme ");
        let idle = tokio::time::timeout(Duration::from_secs(2), explorer.next_event()).await;
        assert!(idle.is_err(), "trailing space dispatched a request");
        assert_eq!(source.queries().len(), 3);
        assert_eq!(explorer.cursor().page, 5);

        // Spaces typed into an empty workflow filter are not a filter either
        explorer.set_workflow_filter("   ");
        let idle = tokio::time::timeout(Duration::from_secs(2), explorer.next_event()).await;
        assert!(idle.is_err());
        assert_eq!(source.queries().len(), 3);
        assert_eq!(explorer.current_query().search.as_deref(), Some("acme"));
    }

    #[tokio::test]
    async fn test_filter_change_resets_page_keeps_size() {
        let source = Arc::new(RecordingSource::default());
        let mut explorer = explorer(&source);
        explorer.start();
        next_settlement(&mut explorer).await;

        explorer.on_page_change(0, 50);
        let paged = explorer.on_page_change(4, 50);
        settle_through(&mut explorer, paged).await;
        assert_eq!(explorer.cursor().page, 5);
        assert_eq!(source.last_query().page, 5);

        let id = explorer
            .set_status_filter(StatusFilter::Only(AccountStatus::Active))
            .expect("status change dispatches");
        assert_eq!(settle_through(&mut explorer, id).await, Settlement::Applied);

        let query = source.last_query();
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size.get(), 50);
        assert_eq!(query.status, Some(AccountStatus::Active));
    }

    #[tokio::test]
    async fn test_same_status_is_not_redispatched() {
        let source = Arc::new(RecordingSource::default());
        let mut explorer = explorer(&source);
        assert!(explorer.set_status_filter(StatusFilter::All).is_none());
        assert!(
            explorer
                .set_status_filter(StatusFilter::Only(AccountStatus::Inactive))
                .is_some()
        );
        assert!(
            explorer
                .set_status_filter(StatusFilter::Only(AccountStatus::Inactive))
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_sort_without_direction_changes_nothing() {
        let source = Arc::new(RecordingSource::default());
        let mut explorer = explorer(&source);
        explorer.start();
        next_settlement(&mut explorer).await;
        let before = explorer.state();

        assert!(explorer.on_sort("records", None).is_none());
        assert!(
            explorer
                .on_sort("", Some(SortDirection::Ascending))
                .is_none()
        );
        assert_eq!(explorer.state(), before);
        assert_eq!(source.queries().len(), 1);
    }

    #[tokio::test]
    async fn test_sort_on_unknown_column_uses_default_field() {
        let source = Arc::new(RecordingSource::default());
        let mut explorer = explorer(&source);
        explorer.on_page_change(2, 25);
        next_settlement(&mut explorer).await;

        assert!(
            explorer
                .on_sort("seats", Some(SortDirection::Descending))
                .is_some()
        );
        next_settlement(&mut explorer).await;

        let query = source.last_query();
        assert_eq!(query.sort_field, SortField::AccountLabel);
        assert_eq!(query.sort_direction, SortDirection::Descending);
        assert_eq!(query.page, 3);
    }

    #[tokio::test]
    async fn test_reloads_send_equal_queries() {
        let source = Arc::new(RecordingSource::default());
        let mut explorer = explorer(&source);
        explorer.set_status_filter(StatusFilter::Only(AccountStatus::Active));
        explorer.reload();
        let last = explorer.reload();
        settle_through(&mut explorer, last).await;

        let queries = source.queries();
        assert_eq!(queries.len(), 3);
        assert_eq!(queries[1], queries[2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_filters_drops_every_filter() {
        let source = Arc::new(RecordingSource::default());
        let mut explorer = explorer(&source);
        explorer.start();
        next_settlement(&mut explorer).await;

        explorer.set_search("acme");
        next_settlement(&mut explorer).await;
        explorer.set_status_filter(StatusFilter::Only(AccountStatus::Active));
        next_settlement(&mut explorer).await;
        explorer.on_page_change(6, 25);
        next_settlement(&mut explorer).await;
        assert_eq!(source.last_query().page, 7);

        explorer.clear_filters();
        next_settlement(&mut explorer).await;

        let query = source.last_query();
        assert_eq!(query.page, 1);
        assert!(!query.has_filters());
        let keys: Vec<&str> = query.to_query_pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["page", "page_size", "sort_by", "sort_dir"]);

        // The cleared value can be typed again
        explorer.set_search("acme");
        assert!(matches!(
            explorer.next_event().await,
            ExplorerEvent::Dispatched(_)
        ));
    }

    #[tokio::test]
    async fn test_clear_filters_cancels_pending_input() {
        let source = Arc::new(RecordingSource::default());
        let mut explorer = explorer(&source);
        explorer.set_search("acme");
        explorer.clear_filters();
        assert!(explorer.next_deadline().is_none());
        next_settlement(&mut explorer).await;
        assert_eq!(source.queries().len(), 1);
        assert!(source.last_query().search.is_none());
    }

    #[tokio::test]
    async fn test_deep_link_seeds_identifier_filter() {
        let source = Arc::new(RecordingSource::default());
        let options = ExplorerOptions {
            deep_link_account: Some("0f3c-42".to_string()),
            ..ExplorerOptions::default()
        };
        let mut explorer = AccountsExplorer::new(Arc::clone(&source), options);

        explorer.start();
        assert!(explorer.next_deadline().is_none());
        next_settlement(&mut explorer).await;
        assert_eq!(source.last_query().account_uuid.as_deref(), Some("0f3c-42"));

        explorer.clear_filters();
        next_settlement(&mut explorer).await;
        assert!(source.last_query().account_uuid.is_none());
    }

    #[tokio::test]
    async fn test_last_dispatched_request_wins() {
        let (release_first, first_gate) = oneshot::channel();
        let (release_second, second_gate) = oneshot::channel();
        let source = Arc::new(GatedSource {
            gates: Mutex::new(HashMap::from([(2, first_gate), (3, second_gate)])),
        });
        let mut explorer = AccountsExplorer::new(source, ExplorerOptions::default());

        let r1 = explorer.on_page_change(1, 25);
        let r2 = explorer.on_page_change(2, 25);

        let second = AccountsPage {
            page: 3,
            page_size: 25,
            total_items: 80,
            total_pages: 4,
            items: vec![],
        };
        release_second.send(second.clone()).unwrap();
        assert_eq!(next_settlement(&mut explorer).await, (r2, Settlement::Applied));

        let first = AccountsPage {
            page: 2,
            ..second.clone()
        };
        release_first.send(first).unwrap();
        assert_eq!(next_settlement(&mut explorer).await, (r1, Settlement::Discarded));

        let state = explorer.state();
        assert_eq!(state.data, Some(second));
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_page() {
        let source = Arc::new(RecordingSource::default());
        let mut explorer = explorer(&source);
        explorer.start();
        next_settlement(&mut explorer).await;

        source.fail_next_with(401);
        explorer.reload();
        next_settlement(&mut explorer).await;

        let state = explorer.state();
        assert_eq!(state.phase, Phase::Failure);
        assert!(state.data.is_some());
        assert_eq!(
            state.error.as_deref(),
            Some("Session expired. Please log in again.")
        );
        assert!(state.failure.is_some_and(|f| f.is_session_expired()));

        // Manual retry recovers
        explorer.reload();
        next_settlement(&mut explorer).await;
        let state = explorer.state();
        assert_eq!(state.phase, Phase::Success);
        assert!(state.error.is_none());
    }
}
