use super::PlatformExtensions;

pub struct Platform;

impl PlatformExtensions for Platform {
    fn is_elevated() -> bool {
        false
    }

    fn cpuinfo() -> Option<String> {
        None
    }

    fn hardware_model() -> Option<String> {
        None
    }
}
