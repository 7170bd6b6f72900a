use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_SEASON: &str = "2023-24";
const DEFAULT_BASE_URL: &str = "https://stats.nba.com/stats";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_DELAY_MS: u64 = 1000;
const DEFAULT_CACHE_TTL_HOURS: u64 = 24;
const CACHE_DIR: &str = "hoopcard";

#[derive(Debug, Clone)]
pub struct CardConfig {
    pub season: String,
    pub base_url: String,
    pub request_timeout: Duration,
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub cache_ttl: Duration,
    pub cache_enabled: bool,
    pub cache_dir: Option<PathBuf>,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            season: DEFAULT_SEASON.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_HOURS * 3600),
            cache_enabled: true,
            cache_dir: default_cache_dir(),
        }
    }
}

impl CardConfig {
    pub fn from_env() -> Self {
        let season = opt_env("NBA_SEASON").unwrap_or_else(|| DEFAULT_SEASON.to_string());
        let base_url = opt_env("NBA_STATS_BASE_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = env_u64("NBA_STATS_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS).clamp(30, 60);
        let max_attempts = env::var("RETRY_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_ATTEMPTS)
            .clamp(1, 10);
        let base_delay_ms = env_u64("RETRY_BASE_DELAY_MS", DEFAULT_BASE_DELAY_MS);
        let ttl_hours = env_u64("CARD_CACHE_TTL_HOURS", DEFAULT_CACHE_TTL_HOURS).max(1);
        let cache_dir = opt_env("CARD_CACHE_DIR")
            .map(PathBuf::from)
            .or_else(default_cache_dir);

        Self {
            season: season.trim().to_string(),
            base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            max_attempts,
            base_delay: Duration::from_millis(base_delay_ms),
            cache_ttl: Duration::from_secs(ttl_hours * 3600),
            cache_enabled: env_bool("CARD_CACHE_ENABLED", true),
            cache_dir,
        }
    }
}

pub fn default_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|val| {
        if val.trim().is_empty() {
            None
        } else {
            Some(val)
        }
    })
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| {
            let t = v.trim().to_ascii_lowercase();
            !(t.is_empty() || t == "0" || t == "false" || t == "off" || t == "no")
        })
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_provider_expectations() {
        let cfg = CardConfig::default();
        assert_eq!(cfg.season, "2023-24");
        assert_eq!(cfg.max_attempts, 3);
        assert_eq!(cfg.request_timeout, Duration::from_secs(60));
        assert_eq!(cfg.cache_ttl, Duration::from_secs(24 * 3600));
    }
}
