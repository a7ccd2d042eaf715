use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
pub const DEFAULT_ADMIN_REFRESH_SECS: u64 = 60;
pub const DEFAULT_NOTIFICATION_MS: u64 = 3000;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend base URL, no trailing slash
    pub backend_url: String,
    /// Admin dashboard auto-refresh period
    pub admin_refresh_secs: u64,
    /// How long a toast notification stays on screen
    pub notification_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            admin_refresh_secs: DEFAULT_ADMIN_REFRESH_SECS,
            notification_ms: DEFAULT_NOTIFICATION_MS,
        }
    }
}

impl ClientConfig {
    /// Runtime environment first, then values baked in at compile time
    /// (the only source available to the wasm build), then defaults.
    pub fn from_env() -> Result<Self> {
        let backend_url = lookup("TUTOR_BACKEND_URL", option_env!("TUTOR_BACKEND_URL"))
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        let admin_refresh_secs = lookup(
            "TUTOR_ADMIN_REFRESH_SECS",
            option_env!("TUTOR_ADMIN_REFRESH_SECS"),
        )
        .unwrap_or_else(|| DEFAULT_ADMIN_REFRESH_SECS.to_string())
        .parse()
        .context("Failed to parse TUTOR_ADMIN_REFRESH_SECS")?;

        let notification_ms = lookup("TUTOR_NOTIFICATION_MS", option_env!("TUTOR_NOTIFICATION_MS"))
            .unwrap_or_else(|| DEFAULT_NOTIFICATION_MS.to_string())
            .parse()
            .context("Failed to parse TUTOR_NOTIFICATION_MS")?;

        Self::new(backend_url, admin_refresh_secs, notification_ms)
    }

    pub fn new(
        backend_url: impl Into<String>,
        admin_refresh_secs: u64,
        notification_ms: u64,
    ) -> Result<Self> {
        let backend_url = backend_url.into().trim().trim_end_matches('/').to_string();

        if !(backend_url.starts_with("http://") || backend_url.starts_with("https://")) {
            anyhow::bail!("Backend URL must start with http:// or https://, got {:?}", backend_url);
        }
        if admin_refresh_secs == 0 {
            anyhow::bail!("Admin refresh interval must be at least one second");
        }

        Ok(Self {
            backend_url,
            admin_refresh_secs,
            notification_ms,
        })
    }

    /// Same backend, default timings.
    pub fn with_backend(backend_url: impl Into<String>) -> Result<Self> {
        Self::new(backend_url, DEFAULT_ADMIN_REFRESH_SECS, DEFAULT_NOTIFICATION_MS)
    }

    pub fn admin_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.admin_refresh_secs)
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }
}

fn lookup(key: &str, compiled: Option<&'static str>) -> Option<String> {
    env::var(key)
        .ok()
        .or_else(|| compiled.map(str::to_string))
        .filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_local_backend() {
        let config = ClientConfig::default();
        assert_eq!(config.backend_url, "http://localhost:5000");
        assert_eq!(config.admin_refresh_interval(), Duration::from_secs(60));
        assert_eq!(config.notification_duration(), Duration::from_millis(DEFAULT_NOTIFICATION_MS));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = ClientConfig::with_backend("https://tutor.example.com/").unwrap();
        assert_eq!(config.backend_url, "https://tutor.example.com");
    }

    #[test]
    fn test_rejects_zero_refresh() {
        assert!(ClientConfig::new(DEFAULT_BACKEND_URL, 0, 3000).is_err());
    }

    #[test]
    fn test_rejects_url_without_scheme() {
        assert!(ClientConfig::with_backend("localhost:5000").is_err());
    }
}
