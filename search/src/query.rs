use crate::proto::TypeTag;
use std::fmt;

/// A settled search: trimmed text plus the tenant scope and type filter it
/// runs under. Two queries are cache-equivalent iff all fields are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SearchQuery {
    text: String,
    scope_id: Option<String>,
    type_filter: Option<TypeTag>,
}

impl SearchQuery {
    pub fn new(text: &str, scope_id: Option<String>, type_filter: Option<TypeTag>) -> Self {
        Self {
            text: text.trim().to_string(),
            scope_id,
            type_filter,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn scope_id(&self) -> Option<&str> {
        self.scope_id.as_deref()
    }

    pub fn type_filter(&self) -> Option<TypeTag> {
        self.type_filter
    }

    /// The same text and scope with no type filter.
    pub fn unfiltered(&self) -> Self {
        Self {
            type_filter: None,
            ..self.clone()
        }
    }

    /// Length in characters, which is what the minimum-length gate counts.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey {
            text: self.text.clone(),
            scope_id: self.scope_id.clone(),
            type_filter: self.type_filter,
        }
    }
}

/// Lookup key for the scoped cache.
///
/// Holds the query fields structurally; `Display` renders `text|scope|type`
/// with `-` for an absent part.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    text: String,
    scope_id: Option<String>,
    type_filter: Option<TypeTag>,
}

impl CacheKey {
    pub fn scope_id(&self) -> Option<&str> {
        self.scope_id.as_deref()
    }

    pub fn in_scope(&self, scope_id: &str) -> bool {
        self.scope_id.as_deref() == Some(scope_id)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}",
            self.text,
            self.scope_id.as_deref().unwrap_or("-"),
            self.type_filter.map(TypeTag::as_str).unwrap_or("-")
        )
    }
}
