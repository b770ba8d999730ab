use crate::proto::SearchResponse;
use crate::proto::TypeTag;
use crate::query::CacheKey;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct Facet {
    #[serde(rename = "type")]
    pub kind: TypeTag,
    pub count: u32,
}

/// Match counts per result type, zero for types the page did not mention.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FacetCounts {
    counts: [u32; TypeTag::COUNT],
}

impl FacetCounts {
    /// Counts for the full match set. Server-reported counts win. Without
    /// them only an unfiltered page can be counted from its own result list;
    /// a filtered page yields `None` because its results cover one type.
    pub fn from_response(
        response: &SearchResponse,
        type_filter: Option<TypeTag>,
    ) -> Option<Self> {
        let mut counts = Self::default();
        if !response.facets.is_empty() {
            for (tag, count) in &response.facets {
                counts.counts[tag.position()] = *count;
            }
            return Some(counts);
        }
        if type_filter.is_some() {
            return None;
        }
        for result in &response.results {
            counts.counts[result.kind.position()] += 1;
        }
        Some(counts)
    }

    pub fn count(&self, kind: TypeTag) -> u32 {
        self.counts[kind.position()]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Every type in display order, zero counts included.
    pub fn facets(&self) -> Vec<Facet> {
        TypeTag::ORDER
            .into_iter()
            .map(|kind| Facet {
                kind,
                count: self.count(kind),
            })
            .collect()
    }
}

/// Holds the facet counts of the last successful page, keyed by the
/// unfiltered query they describe.
#[derive(Debug, Default)]
pub struct FacetAggregator {
    current: FacetCounts,
    source: Option<CacheKey>,
}

impl FacetAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, counts: FacetCounts, source: CacheKey) {
        self.current = counts;
        self.source = Some(source);
    }

    pub fn clear(&mut self) {
        self.current = FacetCounts::default();
        self.source = None;
    }

    /// Whether the held counts belong to the unfiltered query `key`.
    pub fn describes(&self, key: &CacheKey) -> bool {
        self.source.as_ref() == Some(key)
    }

    pub fn counts(&self) -> FacetCounts {
        self.current
    }

    pub fn count(&self, kind: TypeTag) -> u32 {
        self.current.count(kind)
    }

    pub fn facets(&self) -> Vec<Facet> {
        self.current.facets()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::SearchResult;
    use crate::query::SearchQuery;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn result(id: &str, kind: TypeTag) -> SearchResult {
        SearchResult {
            id: id.to_string(),
            kind,
            href: format!("/{kind}/{id}"),
            title: id.to_string(),
        }
    }

    #[test]
    fn server_counts_take_precedence() {
        let response = SearchResponse {
            results: vec![result("v1", TypeTag::Venue)],
            facets: BTreeMap::from([(TypeTag::Event, 12), (TypeTag::Venue, 3)]),
            suggestions: Vec::new(),
        };
        let counts =
            FacetCounts::from_response(&response, Some(TypeTag::Venue)).expect("server counts");
        assert_eq!(counts.count(TypeTag::Event), 12);
        assert_eq!(counts.count(TypeTag::Venue), 3);
        assert_eq!(counts.count(TypeTag::List), 0);
        assert_eq!(counts.total(), 15);
    }

    #[test]
    fn falls_back_to_counting_results() {
        let response = SearchResponse {
            results: vec![
                result("e1", TypeTag::Event),
                result("e2", TypeTag::Event),
                result("o1", TypeTag::Organizer),
            ],
            facets: BTreeMap::new(),
            suggestions: Vec::new(),
        };
        let counts = FacetCounts::from_response(&response, None).expect("unfiltered page");
        assert_eq!(
            counts.facets(),
            vec![
                Facet { kind: TypeTag::Event, count: 2 },
                Facet { kind: TypeTag::Venue, count: 0 },
                Facet { kind: TypeTag::Organizer, count: 1 },
                Facet { kind: TypeTag::Series, count: 0 },
                Facet { kind: TypeTag::List, count: 0 },
            ]
        );
    }

    #[test]
    fn filtered_page_without_server_counts_has_no_counts() {
        let response = SearchResponse {
            results: vec![result("v1", TypeTag::Venue), result("v2", TypeTag::Venue)],
            ..Default::default()
        };
        assert_eq!(FacetCounts::from_response(&response, Some(TypeTag::Venue)), None);
    }

    #[test]
    fn aggregator_clears() {
        let mut aggregator = FacetAggregator::new();
        let response = SearchResponse {
            results: vec![result("e1", TypeTag::Event)],
            ..Default::default()
        };
        let key = SearchQuery::new("jazz", None, None).cache_key();
        let counts = FacetCounts::from_response(&response, None).expect("counts");
        aggregator.update(counts, key.clone());
        assert_eq!(aggregator.count(TypeTag::Event), 1);
        assert!(aggregator.describes(&key));

        aggregator.clear();
        assert!(aggregator.counts().is_empty());
        assert!(!aggregator.describes(&key));
    }
}
