use std::path::{Path, PathBuf};

use sysinfo::{
    Disks, Networks, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind, Users,
};

use super::platform::{PlatformFacts, machine_arch};
use super::snapshot::{NetworkCounters, ResourceUsage, SystemInfo};

/// Reads live OS counters through sysinfo.
pub struct Collector {
    sys: System,
    disk_mount: PathBuf,
}

impl Default for Collector {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Collector {
    pub fn new(disk_mount: impl Into<PathBuf>) -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_all();
        Collector {
            sys,
            disk_mount: disk_mount.into(),
        }
    }

    /// CPU usage needs two refreshes at least `MINIMUM_CPU_UPDATE_INTERVAL` apart,
    /// so this blocks for that interval.
    pub fn sample_resource_usage(&mut self) -> ResourceUsage {
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        self.sys.refresh_cpu_all();
        self.sys.refresh_memory();

        let disks = Disks::new_with_refreshed_list();
        let volumes: Vec<DiskUsage> = disks
            .iter()
            .map(|d| DiskUsage {
                mount_point: d.mount_point().to_path_buf(),
                total: d.total_space(),
                available: d.available_space(),
            })
            .collect();

        ResourceUsage {
            cpu_percent: f64::from(self.sys.global_cpu_usage()),
            memory_percent: percent(self.sys.used_memory(), self.sys.total_memory()),
            disk_percent: disk_percent(&volumes, &self.disk_mount),
        }
    }

    pub fn sample_network_counters(&self) -> NetworkCounters {
        let networks = Networks::new_with_refreshed_list();
        networks
            .iter()
            .fold(NetworkCounters::default(), |acc, (_, data)| NetworkCounters {
                bytes_sent: acc.bytes_sent.saturating_add(data.total_transmitted()),
                bytes_received: acc.bytes_received.saturating_add(data.total_received()),
            })
    }

    pub fn system_info(&self, facts: &PlatformFacts) -> SystemInfo {
        let processor = self
            .sys
            .cpus()
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .filter(|brand| !brand.is_empty())
            .unwrap_or_else(|| "Unknown Processor".to_string());

        SystemInfo {
            os: System::name().unwrap_or_else(|| facts.os.clone()),
            os_version: System::long_os_version()
                .or_else(System::os_version)
                .unwrap_or_default(),
            kernel_version: System::kernel_version().unwrap_or_default(),
            machine: facts.arch.clone(),
            processor,
            hostname: System::host_name().unwrap_or_default(),
            uptime_secs: System::uptime(),
            is_raspberry_pi: facts.is_raspberry_pi(),
        }
    }

    /// Login name of the user owning this process.
    pub fn current_user(&mut self) -> Option<String> {
        let pid = sysinfo::get_current_pid().ok()?;
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_user(UpdateKind::Always),
        );
        let uid = self.sys.process(pid)?.user_id()?.clone();
        let users = Users::new_with_refreshed_list();
        users.get_user_by_id(&uid).map(|user| user.name().to_string())
    }
}

/// One-line platform description for the log, e.g. `Linux-6.1.0-x86_64 (Debian GNU/Linux 12)`.
pub fn platform_string() -> String {
    let name = System::name().unwrap_or_else(|| std::env::consts::OS.to_string());
    let kernel = System::kernel_version().unwrap_or_default();
    let base = format!("{name}-{kernel}-{}", machine_arch());
    match System::long_os_version() {
        Some(long) => format!("{base} ({long})"),
        None => base,
    }
}

#[derive(Debug, Clone, PartialEq)]
struct DiskUsage {
    mount_point: PathBuf,
    total: u64,
    available: u64,
}

fn percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (used as f64 / total as f64) * 100.0
}

/// Usage of the volume mounted at `mount`, or of the largest volume when that
/// mount is not present (e.g. `/` on Windows).
fn disk_percent(volumes: &[DiskUsage], mount: &Path) -> f64 {
    let chosen = volumes
        .iter()
        .find(|v| v.mount_point == mount)
        .or_else(|| volumes.iter().max_by_key(|v| v.total));
    match chosen {
        Some(v) => percent(v.total.saturating_sub(v.available), v.total),
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume(mount: &str, total: u64, available: u64) -> DiskUsage {
        DiskUsage {
            mount_point: PathBuf::from(mount),
            total,
            available,
        }
    }

    #[test]
    fn percent_handles_zero_total() {
        assert_eq!(percent(10, 0), 0.0);
        assert!((percent(1, 4) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn disk_percent_prefers_requested_mount() {
        let volumes = vec![volume("/boot", 1_000, 100), volume("/", 400, 100)];
        assert!((disk_percent(&volumes, Path::new("/")) - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn disk_percent_falls_back_to_largest_volume() {
        let volumes = vec![volume("C:\\", 1_000, 250), volume("D:\\", 200, 0)];
        assert!((disk_percent(&volumes, Path::new("/")) - 75.0).abs() < f64::EPSILON);
        assert_eq!(disk_percent(&[], Path::new("/")), 0.0);
    }

    #[test]
    fn live_resource_usage_is_in_range() {
        let mut collector = Collector::default();
        let usage = collector.sample_resource_usage();
        for value in [usage.cpu_percent, usage.memory_percent, usage.disk_percent] {
            assert!((0.0..=100.0).contains(&value), "out of range: {value}");
        }
    }

    #[test]
    fn platform_string_mentions_arch() {
        assert!(platform_string().contains(&machine_arch()));
    }

    #[test]
    fn system_info_is_populated() {
        let collector = Collector::default();
        let info = collector.system_info(&PlatformFacts::detect());
        assert!(!info.os.is_empty());
        assert!(!info.machine.is_empty());
        assert!(!info.processor.is_empty());
    }
}
