use super::PlatformExtensions;

pub struct Platform;

impl PlatformExtensions for Platform {
    fn is_elevated() -> bool {
        unsafe { libc::geteuid() == 0 }
    }

    fn cpuinfo() -> Option<String> {
        None
    }

    fn hardware_model() -> Option<String> {
        None
    }
}
