use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

pub const RECENT_FILENAME: &str = "recent_searches.json";
pub const DEFAULT_RECENT_CAPACITY: usize = 8;

/// Past query strings, most recent first, persisted as a small JSON file.
#[derive(Debug, Clone)]
pub struct RecentSearchStore {
    path: PathBuf,
    capacity: usize,
}

impl RecentSearchStore {
    pub fn new(home: PathBuf, capacity: usize) -> Self {
        Self {
            path: home.join(RECENT_FILENAME),
            capacity: capacity.max(1),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Moves `query` to the front. Blank queries are ignored; an existing
    /// entry that differs only in case or surrounding whitespace is replaced
    /// by the new spelling.
    pub fn record(&self, query: &str) -> Result<()> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }
        let mut recent = self.read()?;
        let needle = normalize(query);
        recent.queries.retain(|existing| normalize(existing) != needle);
        recent.queries.insert(0, query.to_string());
        recent.queries.truncate(self.capacity);
        self.write(&recent)
    }

    pub fn recent(&self) -> Result<Vec<String>> {
        let mut queries = self.read()?.queries;
        queries.truncate(self.capacity);
        Ok(queries)
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).context("remove recent searches"),
        }
    }

    fn read(&self) -> Result<RecentSearches> {
        match fs::read(&self.path) {
            Ok(data) => serde_json::from_slice(&data).context("parse recent searches"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Ok(RecentSearches::default())
            }
            Err(err) => Err(err).context("read recent searches"),
        }
    }

    fn write(&self, recent: &RecentSearches) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("create recent searches dir")?;
        }
        let data = serde_json::to_vec_pretty(recent).context("serialize recent searches")?;
        fs::write(&self.path, data).context("write recent searches")
    }
}

fn normalize(query: &str) -> String {
    query.trim().to_lowercase()
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct RecentSearches {
    #[serde(default)]
    queries: Vec<String>,
}
