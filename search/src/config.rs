use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "config.toml";
pub const HOME_ENV: &str = "MARQUEE_HOME";

/// Tunables for the search overlay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Search endpoint URL (POST, JSON)
    #[serde(default)]
    pub endpoint: String,

    /// Optional bearer token sent with every search request
    #[serde(default)]
    pub api_token: Option<String>,

    /// Maximum results requested per query
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,

    /// Queries shorter than this (in characters) clear the results
    #[serde(default = "default_min_query_length")]
    pub min_query_length: usize,

    /// Quiet period before a keystroke burst becomes a query
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Loading indicator stays hidden for this long after a request starts
    #[serde(default = "default_spinner_delay_ms")]
    pub spinner_delay_ms: u64,

    /// Rotation period of the placeholder hint while the input is empty
    #[serde(default = "default_placeholder_interval_ms")]
    pub placeholder_interval_ms: u64,

    /// Per-request timeout
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Maximum cached result pages
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Cached page lifetime
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Maximum remembered recent searches
    #[serde(default = "default_recent_capacity")]
    pub recent_capacity: usize,

    /// Placeholder hints cycled while the input is empty
    #[serde(default = "default_placeholders")]
    pub placeholders: Vec<String>,
}

fn default_result_limit() -> usize {
    20
}

fn default_min_query_length() -> usize {
    2
}

fn default_debounce_ms() -> u64 {
    150
}

fn default_spinner_delay_ms() -> u64 {
    200
}

fn default_placeholder_interval_ms() -> u64 {
    3_000
}

fn default_request_timeout_ms() -> u64 {
    8_000
}

fn default_cache_capacity() -> usize {
    100
}

fn default_cache_ttl_secs() -> u64 {
    30
}

fn default_recent_capacity() -> usize {
    8
}

fn default_placeholders() -> Vec<String> {
    [
        "Search events, venues, organizers…",
        "Try \"jazz tonight\"",
        "Find a venue near you",
        "Follow your favorite organizers",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_token: None,
            result_limit: default_result_limit(),
            min_query_length: default_min_query_length(),
            debounce_ms: default_debounce_ms(),
            spinner_delay_ms: default_spinner_delay_ms(),
            placeholder_interval_ms: default_placeholder_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            cache_capacity: default_cache_capacity(),
            cache_ttl_secs: default_cache_ttl_secs(),
            recent_capacity: default_recent_capacity(),
            placeholders: default_placeholders(),
        }
    }
}

impl SearchConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("read {}", path.display()));
            }
        };
        let config: SearchConfig =
            toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
        config
            .validate()
            .map_err(|msg| anyhow::anyhow!("invalid {}: {msg}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.result_limit == 0 {
            return Err("result_limit must be > 0".to_string());
        }
        if self.cache_capacity == 0 {
            return Err("cache_capacity must be > 0".to_string());
        }
        if self.cache_ttl_secs == 0 {
            return Err("cache_ttl_secs must be > 0".to_string());
        }
        if self.request_timeout_ms == 0 {
            return Err("request_timeout_ms must be > 0".to_string());
        }
        if self.placeholder_interval_ms == 0 {
            return Err("placeholder_interval_ms must be > 0".to_string());
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn spinner_delay(&self) -> Duration {
        Duration::from_millis(self.spinner_delay_ms)
    }

    pub fn placeholder_interval(&self) -> Duration {
        Duration::from_millis(self.placeholder_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// `$MARQUEE_HOME`, falling back to `~/.marquee`.
pub fn marquee_home() -> Result<PathBuf> {
    if let Some(value) = std::env::var_os(HOME_ENV)
        && !value.is_empty()
    {
        return Ok(PathBuf::from(value));
    }
    let home = dirs::home_dir().context("could not determine home directory")?;
    Ok(home.join(".marquee"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn default_config_valid() {
        let config = SearchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.debounce(), Duration::from_millis(150));
        assert_eq!(config.min_query_length, 2);
        assert_eq!(config.cache_capacity, 100);
        assert_eq!(config.cache_ttl(), Duration::from_secs(30));
    }

    #[test]
    fn zero_capacity_rejected() {
        let config = SearchConfig {
            cache_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let config = SearchConfig::load(&dir.path().join(CONFIG_FILENAME)).expect("load");
        assert_eq!(config, SearchConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            "endpoint = \"https://api.example.test/search\"\ndebounce_ms = 250\n",
        )
        .expect("write config");

        let config = SearchConfig::load(&path).expect("load");
        assert_eq!(config.endpoint, "https://api.example.test/search");
        assert_eq!(config.debounce(), Duration::from_millis(250));
        assert_eq!(config.result_limit, 20);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "cache_ttl_secs = 0\n").expect("write config");
        assert!(SearchConfig::load(&path).is_err());
    }
}
