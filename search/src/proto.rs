use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Category of a search hit. Declaration order is the display order.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    Event,
    Venue,
    Organizer,
    Series,
    List,
}

impl TypeTag {
    pub const COUNT: usize = 5;

    pub const ORDER: [TypeTag; TypeTag::COUNT] = [
        TypeTag::Event,
        TypeTag::Venue,
        TypeTag::Organizer,
        TypeTag::Series,
        TypeTag::List,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::Event => "event",
            TypeTag::Venue => "venue",
            TypeTag::Organizer => "organizer",
            TypeTag::Series => "series",
            TypeTag::List => "list",
        }
    }

    pub fn position(self) -> usize {
        match self {
            TypeTag::Event => 0,
            TypeTag::Venue => 1,
            TypeTag::Organizer => 2,
            TypeTag::Series => 3,
            TypeTag::List => 4,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown result type `{0}`")]
pub struct UnknownTypeTag(pub String);

impl FromStr for TypeTag {
    type Err = UnknownTypeTag;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        TypeTag::ORDER
            .into_iter()
            .find(|tag| tag.as_str() == normalized)
            .ok_or_else(|| UnknownTypeTag(value.to_string()))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TypeTag,
    #[serde(alias = "display_href")]
    pub href: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub limit: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<TypeTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Decoded endpoint payload. Results and facet keys with a type this client
/// does not know are dropped during decoding rather than failing the page.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "WireResponse")]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub facets: BTreeMap<TypeTag, u32>,
    pub suggestions: Vec<String>,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    results: Vec<WireResult>,
    #[serde(default)]
    facets: BTreeMap<String, u32>,
    #[serde(default)]
    suggestions: Vec<String>,
}

#[derive(Deserialize)]
struct WireResult {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(alias = "display_href")]
    href: String,
    #[serde(default)]
    title: String,
}

impl From<WireResponse> for SearchResponse {
    fn from(wire: WireResponse) -> Self {
        let results = wire
            .results
            .into_iter()
            .filter_map(|raw| match raw.kind.parse::<TypeTag>() {
                Ok(kind) => Some(SearchResult {
                    id: raw.id,
                    kind,
                    href: raw.href,
                    title: raw.title,
                }),
                Err(err) => {
                    debug!("dropping search result {}: {err}", raw.id);
                    None
                }
            })
            .collect();
        let facets = wire
            .facets
            .into_iter()
            .filter_map(|(key, count)| key.parse::<TypeTag>().ok().map(|tag| (tag, count)))
            .collect();
        Self {
            results,
            facets,
            suggestions: wire.suggestions,
        }
    }
}
