use super::PlatformExtensions;

use windows_sys::Win32::UI::Shell::IsUserAnAdmin;

pub struct Platform;

impl PlatformExtensions for Platform {
    fn is_elevated() -> bool {
        unsafe { IsUserAnAdmin() != 0 }
    }

    fn cpuinfo() -> Option<String> {
        None
    }

    fn hardware_model() -> Option<String> {
        None
    }
}
