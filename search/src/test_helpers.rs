#[cfg(test)]
pub(crate) mod fixtures {
    use crate::client::SearchBackend;
    use crate::error::Result;
    use crate::error::SearchError;
    use crate::proto::SearchRequest;
    use crate::proto::SearchResponse;
    use crate::proto::SearchResult;
    use crate::proto::TypeTag;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::sleep;

    const DEFAULT_DELAY: Duration = Duration::from_millis(10);

    type ScriptKey = (String, Option<TypeTag>);

    #[derive(Clone)]
    struct Script {
        delay: Duration,
        outcome: Result<SearchResponse>,
    }

    /// In-memory backend with per-query latency and canned outcomes.
    ///
    /// `respond` and `fail` replace every script for their key; `enqueue`
    /// appends one. Scripts for a key are consumed in order and the last one
    /// keeps answering. Unknown queries answer with an empty page.
    #[derive(Default)]
    pub(crate) struct ScriptedBackend {
        scripts: Mutex<HashMap<ScriptKey, VecDeque<Script>>>,
        calls: Mutex<Vec<SearchRequest>>,
    }

    impl ScriptedBackend {
        pub(crate) fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub(crate) fn respond(
            &self,
            query: &str,
            types: Option<TypeTag>,
            delay_ms: u64,
            response: SearchResponse,
        ) {
            self.push(query, types, delay_ms, Ok(response), true);
        }

        pub(crate) fn enqueue(
            &self,
            query: &str,
            types: Option<TypeTag>,
            delay_ms: u64,
            response: SearchResponse,
        ) {
            self.push(query, types, delay_ms, Ok(response), false);
        }

        pub(crate) fn fail(
            &self,
            query: &str,
            types: Option<TypeTag>,
            delay_ms: u64,
            error: SearchError,
        ) {
            self.push(query, types, delay_ms, Err(error), true);
        }

        pub(crate) fn calls(&self) -> Vec<SearchRequest> {
            match self.calls.lock() {
                Ok(calls) => calls.clone(),
                Err(_) => Vec::new(),
            }
        }

        pub(crate) fn calls_for(&self, query: &str) -> usize {
            self.calls()
                .iter()
                .filter(|request| request.query == query)
                .count()
        }

        fn push(
            &self,
            query: &str,
            types: Option<TypeTag>,
            delay_ms: u64,
            outcome: Result<SearchResponse>,
            replace: bool,
        ) {
            let script = Script {
                delay: Duration::from_millis(delay_ms),
                outcome,
            };
            if let Ok(mut scripts) = self.scripts.lock() {
                let queue = scripts.entry((query.to_string(), types)).or_default();
                if replace {
                    queue.clear();
                }
                queue.push_back(script);
            }
        }

        fn next_script(&self, key: &ScriptKey) -> Script {
            let fallback = Script {
                delay: DEFAULT_DELAY,
                outcome: Ok(SearchResponse::default()),
            };
            let Ok(mut scripts) = self.scripts.lock() else {
                return fallback;
            };
            match scripts.get_mut(key) {
                Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(fallback),
                Some(queue) => queue.front().cloned().unwrap_or(fallback),
                None => fallback,
            }
        }
    }

    #[async_trait]
    impl SearchBackend for ScriptedBackend {
        async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(request.clone());
            }
            let script = self.next_script(&(request.query.clone(), request.types));
            sleep(script.delay).await;
            script.outcome
        }
    }

    pub(crate) fn result(id: &str, kind: TypeTag) -> SearchResult {
        SearchResult {
            id: id.to_string(),
            kind,
            href: format!("/{kind}s/{id}"),
            title: id.to_string(),
        }
    }

    pub(crate) fn response(results: Vec<SearchResult>) -> SearchResponse {
        SearchResponse {
            results,
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn enqueued_scripts_answer_in_order() {
        let backend = ScriptedBackend::new();
        for id in ["a", "b", "c"] {
            backend.enqueue("q", None, 0, response(vec![result(id, TypeTag::Event)]));
        }
        let request = SearchRequest {
            query: "q".to_string(),
            limit: 20,
            types: None,
            scope: None,
        };

        let mut ids = Vec::new();
        for _ in 0..4 {
            let page = backend.search(request.clone()).await.expect("scripted");
            ids.push(page.results[0].id.clone());
        }
        assert_eq!(ids, vec!["a", "b", "c", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn respond_replaces_queued_scripts() {
        let backend = ScriptedBackend::new();
        backend.enqueue("q", None, 0, response(vec![result("a", TypeTag::Event)]));
        backend.enqueue("q", None, 0, response(vec![result("b", TypeTag::Event)]));
        backend.fail("q", None, 0, SearchError::Transport("down".into()));
        backend.respond("q", None, 0, response(vec![result("c", TypeTag::Event)]));

        let request = SearchRequest {
            query: "q".to_string(),
            limit: 20,
            types: None,
            scope: None,
        };
        let page = backend.search(request).await.expect("scripted");
        assert_eq!(page.results[0].id, "c");
    }
}
