use std::path::PathBuf;

const UNKNOWN_HOST: &str = "unknown-host";

/// Settings for one run, built once at startup and never mutated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub cert_dir: PathBuf,
    pub seconds_to_expiry: i64,
    /// `None` disables alert dispatch
    pub routing_key: Option<String>,
    pub hostname: String,
    pub events_url: String,
}

impl MonitorConfig {
    pub fn new(
        cert_dir: PathBuf,
        seconds_to_expiry: i64,
        routing_key: Option<String>,
        hostname: String,
        events_url: String,
    ) -> Self {
        if seconds_to_expiry < 0 {
            tracing::warn!(
                "seconds to expiry is negative ({seconds_to_expiry}), only certificates already past that point will alert"
            );
        }

        let routing_key = routing_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        Self {
            cert_dir,
            seconds_to_expiry,
            routing_key,
            hostname,
            events_url,
        }
    }

    pub fn dispatch_enabled(&self) -> bool {
        self.routing_key.is_some()
    }
}

/// Explicit override if given, otherwise the system hostname
pub fn resolve_hostname(override_name: Option<&str>) -> String {
    if let Some(name) = override_name.filter(|name| !name.is_empty()) {
        return name.to_string();
    }

    match hostname::get() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(e) => {
            tracing::warn!("Unable to determine hostname, using {UNKNOWN_HOST}: {e}");
            UNKNOWN_HOST.to_string()
        }
    }
}
