/// Per-OS facts the rest of the crate needs without reaching for `cfg` itself.
pub trait PlatformExtensions {
    /// Whether the current process runs with superuser/administrator rights.
    fn is_elevated() -> bool;
    /// Raw CPU description, where the OS exposes one as text.
    fn cpuinfo() -> Option<String>;
    /// Board/model string from firmware, e.g. the device-tree model on ARM boards.
    fn hardware_model() -> Option<String>;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
mod other;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
use other as platform_impl;
#[cfg(target_os = "windows")]
use windows as platform_impl;

pub fn is_elevated() -> bool {
    platform_impl::Platform::is_elevated()
}

pub fn cpuinfo() -> Option<String> {
    platform_impl::Platform::cpuinfo()
}

pub fn hardware_model() -> Option<String> {
    platform_impl::Platform::hardware_model()
}

/// Host facts used to pick an update checker at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformFacts {
    pub os: String,
    pub arch: String,
    pub cpuinfo: Option<String>,
    pub elevated: bool,
}

impl PlatformFacts {
    pub fn detect() -> Self {
        let cpuinfo = match (cpuinfo(), hardware_model()) {
            (Some(info), Some(model)) => Some(format!("{info}\nModel\t: {model}")),
            (info, model) => info.or(model),
        };
        PlatformFacts {
            os: std::env::consts::OS.to_string(),
            arch: machine_arch(),
            cpuinfo,
            elevated: is_elevated(),
        }
    }

    pub fn is_raspberry_pi(&self) -> bool {
        is_raspberry_pi(self.cpuinfo.as_deref(), &self.arch)
    }
}

/// Runtime machine string as `uname -m` reports it (`x86_64`, `armv7l`, ...).
pub fn machine_arch() -> String {
    let arch = sysinfo::System::cpu_arch();
    if arch.trim().is_empty() {
        std::env::consts::ARCH.to_string()
    } else {
        arch
    }
}

/// Raspberry Pi boards identify themselves in `/proc/cpuinfo` (or the device-tree
/// model). Without that text, a 32-bit ARM machine string is taken as a Pi.
pub fn is_raspberry_pi(cpuinfo: Option<&str>, arch: &str) -> bool {
    match cpuinfo {
        Some(text) => {
            let lower = text.to_lowercase();
            lower.contains("raspberry pi")
                || lower
                    .lines()
                    .filter(|line| line.starts_with("hardware"))
                    .any(|line| line.contains("bcm"))
        }
        None => matches!(arch, "armv7l" | "armv6l" | "arm"),
    }
}
