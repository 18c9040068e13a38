use super::PlatformExtensions;

pub struct Platform;

impl PlatformExtensions for Platform {
    fn is_elevated() -> bool {
        // "Uid:\treal\teffective\tsaved\tfs"
        let Ok(status) = std::fs::read_to_string("/proc/self/status") else {
            return false;
        };
        status
            .lines()
            .find_map(|line| line.strip_prefix("Uid:"))
            .and_then(|uids| uids.split_whitespace().nth(1))
            .is_some_and(|euid| euid == "0")
    }

    fn cpuinfo() -> Option<String> {
        std::fs::read_to_string("/proc/cpuinfo").ok()
    }

    fn hardware_model() -> Option<String> {
        // Device-tree strings are NUL terminated
        let raw = std::fs::read("/proc/device-tree/model").ok()?;
        let model = String::from_utf8_lossy(&raw)
            .trim_end_matches('\0')
            .trim()
            .to_string();
        (!model.is_empty()).then_some(model)
    }
}
