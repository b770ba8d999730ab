//! The search overlay: input, results, facets, keyboard selection and the
//! small timers around them.
//!
//! The controller is not `Sync` and is meant to be owned by a single task.
//! Timers and network requests never touch it directly; they post
//! [`OverlayEvent`]s that the owner feeds back through
//! [`OverlayController::handle_event`].

use crate::cache::ScopedCache;
use crate::client::SearchBackend;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::executor::CompletionSink;
use crate::executor::ExecutorOptions;
use crate::executor::QueryExecutor;
use crate::executor::QueryTicket;
use crate::executor::Reconciled;
use crate::executor::Resolution;
use crate::facets::FacetAggregator;
use crate::history::RecentSearchStore;
use crate::overlay_event::OverlayEvent;
use crate::overlay_event::OverlayEventSender;
use crate::page::SearchPage;
use crate::placeholder::PlaceholderRotation;
use crate::proto::SearchResult;
use crate::proto::TypeTag;
use crate::query::SearchQuery;
use crate::selection::GroupedResults;
use crate::selection::NavKey;
use crate::selection::Selection;
use crate::selection::SelectionController;
use marquee_async_utils::Debouncer;
use marquee_async_utils::DelayedTask;
use marquee_async_utils::Ticker;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverlayStatus {
    /// Nothing to show: overlay just opened or the query is too short.
    Idle,
    Loading {
        spinner_visible: bool,
    },
    Ready,
    /// The query matched nothing.
    Empty {
        suggestions: Vec<String>,
    },
    /// The last request failed; [`OverlayController::retry`] re-issues it.
    Failed(SearchError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverlayAction {
    None,
    Navigate(SearchResult),
    Closed,
}

#[derive(Clone, Debug)]
pub struct OverlayOptions {
    pub debounce: Duration,
    pub spinner_delay: Duration,
    pub placeholder_interval: Duration,
    pub placeholders: Vec<String>,
    pub executor: ExecutorOptions,
}

impl From<&SearchConfig> for OverlayOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            debounce: config.debounce(),
            spinner_delay: config.spinner_delay(),
            placeholder_interval: config.placeholder_interval(),
            placeholders: config.placeholders.clone(),
            executor: ExecutorOptions {
                min_query_length: config.min_query_length,
                result_limit: config.result_limit,
                request_timeout: config.request_timeout(),
            },
        }
    }
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

pub struct OverlayController {
    events: OverlayEventSender,
    executor: QueryExecutor,
    debouncer: Debouncer<String>,
    recent: Option<RecentSearchStore>,
    spinner_delay: Duration,
    placeholder_interval: Duration,

    open: bool,
    input: String,
    /// Input changed and its debounce has not been handled yet.
    settling: bool,
    scope_id: Option<String>,
    type_filter: Option<TypeTag>,
    page: Option<SearchPage>,
    grouped: GroupedResults,
    facets: FacetAggregator,
    selection: SelectionController,
    status: OverlayStatus,
    placeholder: PlaceholderRotation,
    spinner: Option<DelayedTask>,
    placeholder_ticker: Option<Ticker>,
}

impl OverlayController {
    pub fn new(
        options: OverlayOptions,
        backend: Arc<dyn SearchBackend>,
        cache: Arc<ScopedCache>,
        recent: Option<RecentSearchStore>,
        events: OverlayEventSender,
    ) -> Self {
        let completions = events.clone();
        let sink: CompletionSink = Arc::new(move |completion| {
            completions.send(OverlayEvent::SearchCompleted(completion));
        });
        let settled = events.clone();
        let debouncer = Debouncer::new(options.debounce, move |text: String| {
            settled.send(OverlayEvent::InputSettled(text));
        });
        Self {
            events,
            executor: QueryExecutor::new(backend, cache, options.executor, sink),
            debouncer,
            recent,
            spinner_delay: options.spinner_delay,
            placeholder_interval: options.placeholder_interval,
            open: false,
            input: String::new(),
            settling: false,
            scope_id: None,
            type_filter: None,
            page: None,
            grouped: GroupedResults::default(),
            facets: FacetAggregator::new(),
            selection: SelectionController::new(),
            status: OverlayStatus::Idle,
            placeholder: PlaceholderRotation::new(options.placeholders),
            spinner: None,
            placeholder_ticker: None,
        }
    }

    pub fn open(&mut self) {
        if self.open {
            return;
        }
        self.open = true;
        self.selection.reset();
        self.status = OverlayStatus::Idle;
        self.placeholder.reset();
        self.sync_placeholder_ticker();
    }

    /// Drops everything tied to this session. Any response still in flight
    /// is discarded when it arrives.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.settling = false;
        self.debouncer.cancel();
        self.executor.supersede();
        self.spinner = None;
        self.placeholder_ticker = None;
        self.input.clear();
        self.type_filter = None;
        self.clear_results();
        self.status = OverlayStatus::Idle;
    }

    /// A keystroke. The query runs once the input has been stable for the
    /// debounce period.
    pub fn set_input(&mut self, text: &str) {
        if !self.open || self.input == text {
            return;
        }
        self.input = text.to_string();
        self.settling = true;
        self.sync_placeholder_ticker();
        self.debouncer.push(self.input.clone());
    }

    /// Toggles a filter pill and re-queries under the new key right away.
    pub fn set_type_filter(&mut self, type_filter: Option<TypeTag>) {
        if !self.open || self.type_filter == type_filter {
            return;
        }
        self.type_filter = type_filter;
        // Only an unfiltered page can stand in for the new key while it loads.
        match self.page.take() {
            Some(page) if page.type_filter.is_none() => self.regroup(page),
            Some(_) => self.clear_rows(),
            None => {}
        }
        self.settle_now();
    }

    /// Switches tenant scope. Entries cached under the previous scope are
    /// dropped before anything is resolved under the new one.
    pub fn set_scope(&mut self, scope_id: Option<String>) {
        if self.scope_id == scope_id {
            return;
        }
        if let Some(previous) = self.scope_id.take() {
            let dropped = self.executor.cache().invalidate_scope(&previous);
            debug!("scope changed from {previous}; dropped {dropped} cached pages");
        }
        self.scope_id = scope_id;
        if self.open {
            self.settle_now();
        }
    }

    pub fn handle_key(&mut self, key: NavKey) -> OverlayAction {
        if key == NavKey::Escape {
            let was_open = self.open;
            self.close();
            return if was_open {
                OverlayAction::Closed
            } else {
                OverlayAction::None
            };
        }
        if !self.open {
            return OverlayAction::None;
        }
        match key {
            NavKey::Down => {
                self.selection.move_down();
            }
            NavKey::Up => {
                self.selection.move_up();
            }
            NavKey::Enter => {
                if let Some(index) = self.selection.activate() {
                    return self.activate(index);
                }
            }
            NavKey::Escape => {}
        }
        OverlayAction::None
    }

    /// Navigates to the row at `index` (Enter or a click). Records the query
    /// as a recent search and closes the overlay.
    pub fn activate(&mut self, index: usize) -> OverlayAction {
        if !self.open {
            return OverlayAction::None;
        }
        let Some(result) = self.grouped.get(index).cloned() else {
            return OverlayAction::None;
        };
        if let Some(store) = &self.recent
            && let Err(err) = store.record(&self.input)
        {
            warn!("failed to record recent search: {err:#}");
        }
        self.close();
        OverlayAction::Navigate(result)
    }

    /// Re-issues the failed query, skipping the cache.
    pub fn retry(&mut self) {
        if !self.open {
            return;
        }
        let OverlayStatus::Failed(err) = &self.status else {
            return;
        };
        if !err.is_retryable() {
            return;
        }
        if let Some(ticket) = self.executor.retry() {
            self.start_loading(&ticket);
        }
    }

    pub fn clear_recent(&mut self) {
        if let Some(store) = &self.recent
            && let Err(err) = store.clear()
        {
            warn!("failed to clear recent searches: {err:#}");
        }
    }

    pub fn handle_event(&mut self, event: OverlayEvent) {
        match event {
            OverlayEvent::InputSettled(text) => {
                if self.open && text == self.input {
                    self.settling = false;
                    self.run_query();
                }
            }
            OverlayEvent::SearchCompleted(completion) => {
                let reconciled = self.executor.reconcile(completion);
                match reconciled {
                    Reconciled::Applied(page) => {
                        if let Some(query) = self.executor.current_query().cloned() {
                            self.show_page(page, &query);
                        }
                    }
                    Reconciled::Failed(err) => {
                        self.spinner = None;
                        self.clear_results();
                        self.status = OverlayStatus::Failed(err);
                    }
                    Reconciled::Discarded => {}
                }
            }
            OverlayEvent::SpinnerDue { seq } => {
                let current = self.executor.in_flight().map(QueryTicket::seq);
                if current == Some(seq)
                    && let OverlayStatus::Loading { spinner_visible } = &mut self.status
                {
                    *spinner_visible = true;
                }
            }
            OverlayEvent::PlaceholderTick => {
                if self.open && self.input.is_empty() {
                    self.placeholder.advance();
                }
            }
        }
    }

    /// No keystroke waiting on the debounce and no request in flight.
    pub fn is_settled(&self) -> bool {
        !self.settling && !self.executor.is_loading()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn scope_id(&self) -> Option<&str> {
        self.scope_id.as_deref()
    }

    pub fn type_filter(&self) -> Option<TypeTag> {
        self.type_filter
    }

    pub fn status(&self) -> &OverlayStatus {
        &self.status
    }

    pub fn results(&self) -> &GroupedResults {
        &self.grouped
    }

    pub fn facets(&self) -> &FacetAggregator {
        &self.facets
    }

    pub fn selection(&self) -> Selection {
        self.selection.selection()
    }

    pub fn selection_version(&self) -> u64 {
        self.selection.version()
    }

    /// Hint for the empty input, if it is empty.
    pub fn placeholder(&self) -> Option<&str> {
        if self.input.is_empty() {
            self.placeholder.current()
        } else {
            None
        }
    }

    /// Recent searches to offer while the input is empty.
    pub fn recent_searches(&self) -> Vec<String> {
        if !self.open || !self.input.is_empty() {
            return Vec::new();
        }
        let Some(store) = &self.recent else {
            return Vec::new();
        };
        store.recent().unwrap_or_else(|err| {
            warn!("failed to read recent searches: {err:#}");
            Vec::new()
        })
    }

    fn settle_now(&mut self) {
        self.debouncer.cancel();
        self.settling = false;
        self.run_query();
    }

    fn run_query(&mut self) {
        let query = SearchQuery::new(&self.input, self.scope_id.clone(), self.type_filter);
        match self.executor.resolve(query.clone()) {
            Resolution::Cleared => {
                self.spinner = None;
                self.clear_results();
                self.status = OverlayStatus::Idle;
            }
            Resolution::Ready(page) => {
                debug!("serving {:?} from cache", self.input);
                self.show_page(page, &query);
            }
            Resolution::Pending(ticket) => self.start_loading(&ticket),
        }
    }

    fn start_loading(&mut self, ticket: &QueryTicket) {
        self.status = OverlayStatus::Loading {
            spinner_visible: false,
        };
        let events = self.events.clone();
        let seq = ticket.seq();
        self.spinner = Some(DelayedTask::spawn(self.spinner_delay, move || {
            events.send(OverlayEvent::SpinnerDue { seq });
        }));
    }

    fn show_page(&mut self, page: SearchPage, query: &SearchQuery) {
        self.spinner = None;
        self.update_facets(&page, query);
        self.regroup(page);
    }

    /// Facets always describe the unfiltered match set. A filtered page
    /// without server counts keeps the counts already held for the same
    /// text, or borrows them from the cached unfiltered page.
    fn update_facets(&mut self, page: &SearchPage, query: &SearchQuery) {
        let unfiltered = query.unfiltered().cache_key();
        if let Some(counts) = page.facets {
            self.facets.update(counts, unfiltered);
            return;
        }
        if self.facets.describes(&unfiltered) {
            return;
        }
        let cached = self
            .executor
            .cache()
            .get(&unfiltered)
            .and_then(|entry| entry.page.facets);
        match cached {
            Some(counts) => self.facets.update(counts, unfiltered),
            None => self.facets.clear(),
        }
    }

    fn regroup(&mut self, page: SearchPage) {
        self.grouped = GroupedResults::build(&page.results, self.type_filter);
        self.selection.reshape(self.grouped.len());
        self.status = if self.grouped.is_empty() {
            OverlayStatus::Empty {
                suggestions: page.suggestions.clone(),
            }
        } else {
            OverlayStatus::Ready
        };
        self.page = Some(page);
    }

    /// Drops the visible rows but keeps the facet counts.
    fn clear_rows(&mut self) {
        self.page = None;
        self.grouped = GroupedResults::default();
        self.selection.reset();
    }

    fn clear_results(&mut self) {
        self.clear_rows();
        self.facets.clear();
    }

    fn sync_placeholder_ticker(&mut self) {
        let wanted = self.open && self.input.is_empty() && !self.placeholder.is_static();
        if !wanted {
            self.placeholder_ticker = None;
            return;
        }
        if self.placeholder_ticker.is_none() {
            let events = self.events.clone();
            self.placeholder_ticker = Some(Ticker::spawn(self.placeholder_interval, move || {
                events.send(OverlayEvent::PlaceholderTick);
            }));
        }
    }
}

impl std::fmt::Debug for OverlayController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayController")
            .field("open", &self.open)
            .field("input", &self.input)
            .field("scope_id", &self.scope_id)
            .field("type_filter", &self.type_filter)
            .field("status", &self.status)
            .field("selection", &self.selection)
            .finish()
    }
}
