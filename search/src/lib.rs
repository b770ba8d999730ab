//! Incremental search for the marquee overlay: debounced input, a scoped
//! result cache, last-query-wins request handling, facet counts and keyboard
//! selection over type-grouped results.

pub mod cache;
pub mod client;
pub mod config;
mod error;
pub mod executor;
pub mod facets;
pub mod history;
pub mod overlay;
mod overlay_event;
mod page;
pub mod placeholder;
pub mod proto;
pub mod query;
pub mod selection;
mod test_helpers;

pub use cache::ScopedCache;
pub use client::ClientOptions;
pub use client::HttpSearchClient;
pub use client::SearchBackend;
pub use config::SearchConfig;
pub use error::Result;
pub use error::SearchError;
pub use executor::QueryExecutor;
pub use history::RecentSearchStore;
pub use overlay::OverlayAction;
pub use overlay::OverlayController;
pub use overlay::OverlayOptions;
pub use overlay::OverlayStatus;
pub use overlay_event::OverlayEvent;
pub use overlay_event::OverlayEventSender;
pub use page::SearchPage;
pub use proto::SearchResult;
pub use proto::TypeTag;
pub use query::SearchQuery;
pub use selection::NavKey;
pub use selection::Selection;
