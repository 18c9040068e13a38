use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
}

/// Cumulative byte counters summed over all interfaces since boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkCounters {
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bandwidth {
    pub download_mbps: f64,
    pub upload_mbps: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub os_version: String,
    pub kernel_version: String,
    pub machine: String,
    pub processor: String,
    pub hostname: String,
    pub uptime_secs: u64,
    pub is_raspberry_pi: bool,
}

/// One immutable collection of simultaneously-sampled system metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub target: Option<String>,
    pub response_time_ms: Option<f64>,
    pub updates_available: bool,
    pub updates_installed: bool,
    pub download_mbps: Option<f64>,
    pub upload_mbps: Option<f64>,
    pub system: SystemInfo,
    pub taken_at_unix_s: u64,
}

/// Parts gathered by the builder before they are frozen into a [`Snapshot`].
#[derive(Debug, Clone, Default)]
pub struct SnapshotParts {
    pub resources: ResourceUsage,
    pub network: NetworkCounters,
    pub target: Option<String>,
    pub response_time_ms: Option<f64>,
    pub updates_available: bool,
    pub updates_installed: bool,
    pub bandwidth: Option<Bandwidth>,
    pub system: SystemInfo,
    pub taken_at_unix_s: u64,
}

impl Snapshot {
    pub fn from_parts(parts: SnapshotParts) -> Self {
        let (download_mbps, upload_mbps) = match parts.bandwidth {
            Some(bw) => (finite(bw.download_mbps), finite(bw.upload_mbps)),
            None => (None, None),
        };
        Snapshot {
            cpu_percent: clamp_percent(parts.resources.cpu_percent),
            memory_percent: clamp_percent(parts.resources.memory_percent),
            disk_percent: clamp_percent(parts.resources.disk_percent),
            bytes_sent: parts.network.bytes_sent,
            bytes_received: parts.network.bytes_received,
            target: parts.target,
            response_time_ms: parts.response_time_ms.and_then(finite),
            updates_available: parts.updates_available,
            updates_installed: parts.updates_installed,
            download_mbps,
            upload_mbps,
            system: parts.system,
            taken_at_unix_s: parts.taken_at_unix_s,
        }
    }

    pub fn resources(&self) -> ResourceUsage {
        ResourceUsage {
            cpu_percent: self.cpu_percent,
            memory_percent: self.memory_percent,
            disk_percent: self.disk_percent,
        }
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
