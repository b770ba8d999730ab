//! Resolves settled queries into result pages.
//!
//! Every network request is tagged with a [`QueryTicket`]. Only the ticket of
//! the most recent query handed to [`QueryExecutor::resolve`] may apply its
//! response; anything older is dropped in [`QueryExecutor::reconcile`] no
//! matter the order in which responses arrive.

use crate::cache::ScopedCache;
use crate::client::SearchBackend;
use crate::error::Result;
use crate::error::SearchError;
use crate::page::SearchPage;
use crate::proto::SearchRequest;
use crate::proto::SearchResponse;
use crate::query::SearchQuery;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryTicket {
    seq: u64,
    query: SearchQuery,
}

impl QueryTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }
}

/// A finished request, delivered back to the owner of the executor.
#[derive(Debug)]
pub struct Completion {
    pub ticket: QueryTicket,
    pub outcome: Result<SearchResponse>,
}

pub type CompletionSink = Arc<dyn Fn(Completion) + Send + Sync>;

#[derive(Debug, PartialEq)]
pub enum Resolution {
    /// Query below the minimum length; results and facets must be cleared.
    Cleared,
    /// Served from cache.
    Ready(SearchPage),
    /// Request in flight; its [`Completion`] arrives through the sink.
    Pending(QueryTicket),
}

#[derive(Debug, PartialEq)]
pub enum Reconciled {
    Applied(SearchPage),
    Failed(SearchError),
    /// Superseded by a newer query; must not touch any state.
    Discarded,
}

#[derive(Clone, Debug)]
pub struct ExecutorOptions {
    pub min_query_length: usize,
    pub result_limit: usize,
    pub request_timeout: Duration,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            min_query_length: 2,
            result_limit: 20,
            request_timeout: crate::client::DEFAULT_TIMEOUT,
        }
    }
}

pub struct QueryExecutor {
    backend: Arc<dyn SearchBackend>,
    cache: Arc<ScopedCache>,
    sink: CompletionSink,
    options: ExecutorOptions,
    next_seq: u64,
    in_flight: Option<QueryTicket>,
    current: Option<SearchQuery>,
}

impl QueryExecutor {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        cache: Arc<ScopedCache>,
        options: ExecutorOptions,
        sink: CompletionSink,
    ) -> Self {
        Self {
            backend,
            cache,
            sink,
            options,
            next_seq: 0,
            in_flight: None,
            current: None,
        }
    }

    pub fn resolve(&mut self, query: SearchQuery) -> Resolution {
        // Whatever happens below, any older request is now stale.
        self.in_flight = None;
        self.current = Some(query.clone());
        if query.char_len() < self.options.min_query_length {
            return Resolution::Cleared;
        }
        if let Some(entry) = self.cache.get(&query.cache_key()) {
            return Resolution::Ready(entry.page.clone());
        }
        Resolution::Pending(self.issue(query))
    }

    /// Re-issues the current query against the network, skipping the cache.
    pub fn retry(&mut self) -> Option<QueryTicket> {
        let query = self.current.clone()?;
        if query.char_len() < self.options.min_query_length {
            return None;
        }
        Some(self.issue(query))
    }

    pub fn reconcile(&mut self, completion: Completion) -> Reconciled {
        let Completion { ticket, outcome } = completion;
        if self.in_flight.as_ref() != Some(&ticket) {
            debug!(
                "discarding superseded search response #{} for {}",
                ticket.seq,
                ticket.query.cache_key()
            );
            return Reconciled::Discarded;
        }
        self.in_flight = None;
        match outcome {
            Ok(response) => {
                let page = SearchPage::from_response(response, ticket.query.type_filter());
                self.cache.set(ticket.query.cache_key(), page.clone());
                Reconciled::Applied(page)
            }
            Err(err) => {
                warn!("search for {} failed: {err}", ticket.query.cache_key());
                Reconciled::Failed(err)
            }
        }
    }

    /// Forgets the current query so every in-flight response is discarded.
    pub fn supersede(&mut self) {
        self.in_flight = None;
        self.current = None;
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<&QueryTicket> {
        self.in_flight.as_ref()
    }

    pub fn current_query(&self) -> Option<&SearchQuery> {
        self.current.as_ref()
    }

    pub fn cache(&self) -> &Arc<ScopedCache> {
        &self.cache
    }

    fn issue(&mut self, query: SearchQuery) -> QueryTicket {
        self.next_seq += 1;
        let ticket = QueryTicket {
            seq: self.next_seq,
            query,
        };
        self.in_flight = Some(ticket.clone());

        let request = SearchRequest {
            query: ticket.query.text().to_string(),
            limit: self.options.result_limit,
            types: ticket.query.type_filter(),
            scope: ticket.query.scope_id().map(str::to_string),
        };
        debug!("search request #{} for {}", ticket.seq, ticket.query.cache_key());
        let backend = Arc::clone(&self.backend);
        let sink = Arc::clone(&self.sink);
        let timeout = self.options.request_timeout;
        let task_ticket = ticket.clone();
        tokio::spawn(async move {
            let outcome = match tokio::time::timeout(timeout, backend.search(request)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(SearchError::Timeout(timeout)),
            };
            sink(Completion {
                ticket: task_ticket,
                outcome,
            });
        });
        ticket
    }
}

impl std::fmt::Debug for QueryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExecutor")
            .field("options", &self.options)
            .field("in_flight", &self.in_flight)
            .field("current", &self.current)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::TypeTag;
    use crate::test_helpers::fixtures::ScriptedBackend;
    use crate::test_helpers::fixtures::response;
    use crate::test_helpers::fixtures::result;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn executor(backend: Arc<ScriptedBackend>) -> (QueryExecutor, UnboundedReceiver<Completion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink: CompletionSink = Arc::new(move |completion| {
            let _ = tx.send(completion);
        });
        let options = ExecutorOptions {
            request_timeout: Duration::from_secs(2),
            ..Default::default()
        };
        let cache = Arc::new(ScopedCache::new(100, Duration::from_secs(30)));
        (QueryExecutor::new(backend, cache, options, sink), rx)
    }

    fn query(text: &str) -> SearchQuery {
        SearchQuery::new(text, None, None)
    }

    #[tokio::test(start_paused = true)]
    async fn short_query_clears_without_network() {
        let backend = ScriptedBackend::new();
        let (mut executor, _rx) = executor(backend.clone());

        assert_eq!(executor.resolve(query(" j ")), Resolution::Cleared);
        assert!(backend.calls().is_empty());
        assert!(executor.cache().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn miss_then_hit() {
        let backend = ScriptedBackend::new();
        backend.respond("jazz", None, 50, response(vec![result("e1", TypeTag::Event)]));
        let (mut executor, mut rx) = executor(backend.clone());

        let Resolution::Pending(ticket) = executor.resolve(query("jazz")) else {
            panic!("expected a network request");
        };
        assert!(executor.is_loading());
        let completion = rx.recv().await.expect("completion");
        assert_eq!(completion.ticket, ticket);
        let Reconciled::Applied(page) = executor.reconcile(completion) else {
            panic!("expected applied page");
        };
        assert_eq!(page.results.len(), 1);
        assert!(!executor.is_loading());

        assert_eq!(executor.resolve(query("jazz")), Resolution::Ready(page));
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_stale_response_is_discarded() {
        let backend = ScriptedBackend::new();
        backend.respond("jaz", None, 400, response(vec![result("old", TypeTag::Event)]));
        backend.respond("jazz", None, 50, response(vec![result("new", TypeTag::Event)]));
        let (mut executor, mut rx) = executor(backend);

        let Resolution::Pending(first) = executor.resolve(query("jaz")) else {
            panic!("expected first request");
        };
        let Resolution::Pending(second) = executor.resolve(query("jazz")) else {
            panic!("expected second request");
        };

        let fast = rx.recv().await.expect("fast completion");
        assert_eq!(fast.ticket, second);
        assert!(matches!(executor.reconcile(fast), Reconciled::Applied(_)));

        let slow = rx.recv().await.expect("slow completion");
        assert_eq!(slow.ticket, first);
        assert_eq!(executor.reconcile(slow), Reconciled::Discarded);
        // The stale page never reaches the cache either.
        assert!(executor.cache().get(&query("jaz").cache_key()).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn errors_are_not_cached_and_retry_refetches() {
        let backend = ScriptedBackend::new();
        backend.fail("jazz", None, 10, SearchError::Transport("connection reset".into()));
        let (mut executor, mut rx) = executor(backend.clone());

        executor.resolve(query("jazz"));
        let completion = rx.recv().await.expect("completion");
        assert_eq!(
            executor.reconcile(completion),
            Reconciled::Failed(SearchError::Transport("connection reset".into()))
        );
        assert!(executor.cache().is_empty());

        backend.respond("jazz", None, 10, response(vec![result("e1", TypeTag::Event)]));
        let ticket = executor.retry().expect("retry issues a request");
        let completion = rx.recv().await.expect("retry completion");
        assert_eq!(completion.ticket, ticket);
        assert!(matches!(executor.reconcile(completion), Reconciled::Applied(_)));
        assert_eq!(backend.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_request_times_out() {
        let backend = ScriptedBackend::new();
        backend.respond("jazz", None, 60_000, response(Vec::new()));
        let (mut executor, mut rx) = executor(backend);

        executor.resolve(query("jazz"));
        let completion = rx.recv().await.expect("completion");
        assert_eq!(
            executor.reconcile(completion),
            Reconciled::Failed(SearchError::Timeout(Duration::from_secs(2)))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn filter_change_uses_a_new_key() {
        let backend = ScriptedBackend::new();
        backend.respond("jazz", None, 10, response(vec![result("e1", TypeTag::Event)]));
        backend.respond(
            "jazz",
            Some(TypeTag::Venue),
            10,
            response(vec![result("v1", TypeTag::Venue)]),
        );
        let (mut executor, mut rx) = executor(backend.clone());

        executor.resolve(query("jazz"));
        let completion = rx.recv().await.expect("completion");
        executor.reconcile(completion);

        let filtered = SearchQuery::new("jazz", None, Some(TypeTag::Venue));
        let Resolution::Pending(ticket) = executor.resolve(filtered) else {
            panic!("filter change must not be served from the unfiltered entry");
        };
        assert_eq!(ticket.query().type_filter(), Some(TypeTag::Venue));
        let calls = backend.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].types, Some(TypeTag::Venue));
    }

    #[tokio::test(start_paused = true)]
    async fn supersede_discards_in_flight() {
        let backend = ScriptedBackend::new();
        backend.respond("jazz", None, 100, response(Vec::new()));
        let (mut executor, mut rx) = executor(backend);

        executor.resolve(query("jazz"));
        executor.supersede();
        let completion = rx.recv().await.expect("completion");
        assert_eq!(executor.reconcile(completion), Reconciled::Discarded);
        assert!(executor.retry().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn cache_hit_supersedes_in_flight_request() {
        let backend = ScriptedBackend::new();
        backend.respond("jazz", None, 10, response(vec![result("e1", TypeTag::Event)]));
        backend.respond("rock", None, 500, response(vec![result("r1", TypeTag::Event)]));
        let (mut executor, mut rx) = executor(backend);

        executor.resolve(query("jazz"));
        let completion = rx.recv().await.expect("completion");
        executor.reconcile(completion);

        executor.resolve(query("rock"));
        assert!(matches!(executor.resolve(query("jazz")), Resolution::Ready(_)));
        let late = rx.recv().await.expect("late completion");
        assert_eq!(executor.reconcile(late), Reconciled::Discarded);
    }
}
