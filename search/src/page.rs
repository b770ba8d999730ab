use crate::facets::FacetCounts;
use crate::proto::SearchResponse;
use crate::proto::SearchResult;
use crate::proto::TypeTag;

/// One resolved result page as the overlay consumes it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchPage {
    pub results: Vec<SearchResult>,
    /// `None` for a filtered page the server sent without counts.
    pub facets: Option<FacetCounts>,
    pub suggestions: Vec<String>,
    /// Filter the page was fetched under.
    pub type_filter: Option<TypeTag>,
}

impl SearchPage {
    pub fn from_response(response: SearchResponse, type_filter: Option<TypeTag>) -> Self {
        let facets = FacetCounts::from_response(&response, type_filter);
        Self {
            results: response.results,
            facets,
            suggestions: response.suggestions,
            type_filter,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
