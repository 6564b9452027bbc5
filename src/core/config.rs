use std::path::PathBuf;
use std::time::Duration;

// ---------------------------------------------------------------------------
// AssistConfig — file-based config loader (assist-service.json) with env-var fallback
// ---------------------------------------------------------------------------

pub const ENV_CONFIG_PATH: &str = "ASSIST_SERVICE_CONFIG";
pub const ENV_BASE_URL: &str = "STACKEXCHANGE_BASE_URL";
pub const ENV_SITE: &str = "STACKEXCHANGE_SITE";
pub const ENV_MIN_DELAY_MS: &str = "STACKEXCHANGE_MIN_DELAY_MS";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";
pub const ENV_HTTP_CONNECT_TIMEOUT_SECS: &str = "HTTP_CONNECT_TIMEOUT_SECS";

pub const DEFAULT_BASE_URL: &str = "https://api.stackexchange.com/2.3";
pub const DEFAULT_SITE: &str = "stackoverflow";
pub const DEFAULT_MIN_DELAY_MS: u64 = 1000;
/// The remote API never pages past a single page of at most this many items.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Stack Exchange sub-config (mirrors the `stackexchange` key in assist-service.json).
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct StackExchangeConfig {
    /// API root, e.g. `https://api.stackexchange.com/2.3`. Tests point this at a mock server.
    pub base_url: Option<String>,
    /// Site slug sent as `site=`. Defaults to `stackoverflow`.
    pub site: Option<String>,
    /// Minimum gap between two remote calls, in milliseconds. Default: 1000.
    pub min_delay_ms: Option<u64>,
    /// Page size cap. Values above 10 are clamped.
    pub page_size: Option<usize>,
}

impl StackExchangeConfig {
    /// Base URL: JSON field → `STACKEXCHANGE_BASE_URL` env var → public API.
    pub fn resolve_base_url(&self) -> String {
        if let Some(u) = &self.base_url {
            if !u.trim().is_empty() {
                return u.trim().trim_end_matches('/').to_string();
            }
        }
        std::env::var(ENV_BASE_URL)
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Site: JSON field → `STACKEXCHANGE_SITE` env var → `stackoverflow`.
    pub fn resolve_site(&self) -> String {
        if let Some(s) = &self.site {
            if !s.trim().is_empty() {
                return s.trim().to_string();
            }
        }
        std::env::var(ENV_SITE)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SITE.to_string())
    }

    /// Throttle delay: JSON field → `STACKEXCHANGE_MIN_DELAY_MS` env var → 1s.
    pub fn resolve_min_delay(&self) -> Duration {
        let ms = self.min_delay_ms.unwrap_or_else(|| {
            std::env::var(ENV_MIN_DELAY_MS)
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_MIN_DELAY_MS)
        });
        Duration::from_millis(ms)
    }

    pub fn resolve_page_size(&self) -> usize {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, DEFAULT_PAGE_SIZE)
    }
}

/// Top-level config loaded from `assist-service.json`.
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct AssistConfig {
    #[serde(default)]
    pub stackexchange: StackExchangeConfig,
}

fn config_candidates() -> Vec<PathBuf> {
    let mut v = vec![
        PathBuf::from("assist-service.json"),
        PathBuf::from("../assist-service.json"),
    ];
    if let Some(home) = dirs::home_dir() {
        v.push(home.join(".assist-service").join("config.json"));
    }
    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        if !env_path.trim().is_empty() {
            v.insert(0, PathBuf::from(env_path));
        }
    }
    v
}

/// Load `assist-service.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `ASSIST_SERVICE_CONFIG` env var path
/// 2. `./assist-service.json`
/// 3. `../assist-service.json`
/// 4. `~/.assist-service/config.json`
///
/// Missing file → `AssistConfig::default()` (all env-var fallbacks apply).
/// Parse error → log a warning, return `AssistConfig::default()`.
pub fn load_assist_config() -> AssistConfig {
    load_assist_config_from(&config_candidates())
}

pub fn load_assist_config_from(candidates: &[PathBuf]) -> AssistConfig {
    for path in candidates {
        let Ok(contents) = std::fs::read_to_string(path) else {
            continue;
        };
        match serde_json::from_str::<AssistConfig>(&contents) {
            Ok(cfg) => {
                tracing::info!("assist-service config loaded from {}", path.display());
                return cfg;
            }
            Err(e) => {
                tracing::warn!(
                    "assist-service config parse error at {}: {} - using defaults",
                    path.display(),
                    e
                );
                return AssistConfig::default();
            }
        }
    }

    AssistConfig::default()
}

fn env_secs(key: &str, default: u64) -> Duration {
    let secs = std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default);
    Duration::from_secs(secs)
}

/// Whole-request timeout for remote calls (`HTTP_TIMEOUT_SECS`, default 30).
pub fn http_timeout() -> Duration {
    env_secs(ENV_HTTP_TIMEOUT_SECS, 30)
}

/// Connect timeout for remote calls (`HTTP_CONNECT_TIMEOUT_SECS`, default 10).
pub fn http_connect_timeout() -> Duration {
    env_secs(ENV_HTTP_CONNECT_TIMEOUT_SECS, 10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn explicit_fields_win_over_defaults() {
        let cfg: AssistConfig = serde_json::from_str(
            r#"{"stackexchange": {"base_url": "http://127.0.0.1:9999/2.3/", "site": "serverfault", "min_delay_ms": 5, "page_size": 50}}"#,
        )
        .unwrap();
        let se = &cfg.stackexchange;
        assert_eq!(se.resolve_base_url(), "http://127.0.0.1:9999/2.3");
        assert_eq!(se.resolve_site(), "serverfault");
        assert_eq!(se.resolve_min_delay(), Duration::from_millis(5));
        assert_eq!(se.resolve_page_size(), 10);
    }

    #[test]
    fn empty_document_parses_to_defaults() {
        let cfg: AssistConfig = serde_json::from_str("{}").unwrap();
        assert!(cfg.stackexchange.base_url.is_none());
        assert_eq!(cfg.stackexchange.resolve_page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn loader_skips_missing_and_reads_first_existing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"stackexchange": {{"site": "askubuntu"}}}}"#).unwrap();

        let candidates = vec![
            PathBuf::from("/definitely/not/here/assist-service.json"),
            file.path().to_path_buf(),
        ];
        let cfg = load_assist_config_from(&candidates);
        assert_eq!(cfg.stackexchange.site.as_deref(), Some("askubuntu"));
    }

    #[test]
    fn loader_falls_back_to_defaults_on_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let cfg = load_assist_config_from(&[file.path().to_path_buf()]);
        assert!(cfg.stackexchange.site.is_none());
    }
}
