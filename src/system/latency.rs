use std::time::{Duration, Instant};

use crate::error::Result;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// A single blocking round-trip to a target.
pub trait LatencyProbe {
    /// Time from sending the request until the response head arrives.
    fn probe(&self, url: &str) -> Result<Duration>;
}

pub struct HttpProbe {
    client: reqwest::blocking::Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(concat!("system-analyzer/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpProbe { client })
    }
}

impl LatencyProbe for HttpProbe {
    fn probe(&self, url: &str) -> Result<Duration> {
        let started = Instant::now();
        let response = self.client.get(url).send()?;
        let elapsed = started.elapsed();
        tracing::debug!(url, status = %response.status(), ?elapsed, "probe answered");
        Ok(elapsed)
    }
}

/// Bare hosts get an `http://` scheme; explicit http/https URLs pass through.
pub fn normalize_target(target: &str) -> String {
    let target = target.trim();
    let lower = target.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        target.to_string()
    } else {
        format!("http://{target}")
    }
}

pub fn duration_ms(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}
