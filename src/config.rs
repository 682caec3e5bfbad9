use std::env;
use std::time::Duration;

/// Which exchange kline endpoint the bridge is backed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    /// Array-of-arrays klines, multi-resolution.
    Zg,
    /// Nested JSON klines, daily bars only.
    Huobi,
}

impl Upstream {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "zg" => Some(Self::Zg),
            "huobi" => Some(Self::Huobi),
            _ => None,
        }
    }

    pub fn default_url(self) -> &'static str {
        match self {
            Self::Zg => "http://www.zg.com/api/v1/kline",
            Self::Huobi => "https://api.huobi.pro/market/history/kline",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Zg => "zg",
            Self::Huobi => "huobi",
        }
    }
}

/// Bridge configuration derived from environment variables.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub bind: String,
    pub port: u16,
    pub route_prefix: String,
    pub upstream: Upstream,
    pub upstream_url: String,
    pub upstream_timeout: Duration,
}

fn env_str(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_u16(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Strip trailing slashes and make sure the prefix starts with one.
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

impl BridgeConfig {
    pub fn from_env() -> Self {
        let upstream_name = env_str("UDF_UPSTREAM", "zg");
        let upstream = Upstream::parse(&upstream_name).unwrap_or_else(|| {
            tracing::warn!("unknown UDF_UPSTREAM {upstream_name:?}, falling back to zg");
            Upstream::Zg
        });

        Self {
            bind: env_str("UDF_BIND", "0.0.0.0"),
            port: env_u16("UDF_PORT", 8080),
            route_prefix: normalize_prefix(&env_str("UDF_ROUTE_PREFIX", "/api/v1/udf")),
            upstream,
            upstream_url: env_str("UDF_UPSTREAM_URL", upstream.default_url()),
            upstream_timeout: Duration::from_millis(env_u64("UDF_UPSTREAM_TIMEOUT_MS", 10_000)),
        }
    }

    /// Defaults for the given upstream, without reading the environment.
    #[cfg(test)]
    pub fn for_upstream(upstream: Upstream) -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
            route_prefix: "/api/v1/udf".to_string(),
            upstream,
            upstream_url: upstream.default_url().to_string(),
            upstream_timeout: Duration::from_secs(10),
        }
    }
}
