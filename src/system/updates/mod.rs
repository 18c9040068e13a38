//! Platform-native OS update queries.
//!
//! One [`UpdateChecker`] is chosen at startup from [`PlatformFacts`]; the builder
//! only ever talks to the trait.

mod apt;
mod softwareupdate;
mod windows_update;

pub use apt::AptChecker;
pub use softwareupdate::SoftwareUpdateChecker;
pub use windows_update::WindowsUpdateChecker;

use crate::error::{AnalyzerError, Result};
use crate::system::command::CommandRunner;
use crate::system::platform::PlatformFacts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateReport {
    pub pending: usize,
}

impl UpdateReport {
    pub fn available(&self) -> bool {
        self.pending > 0
    }
}

pub trait UpdateChecker {
    /// Human-readable label, e.g. "apt" or "softwareupdate".
    fn name(&self) -> &'static str;
    fn check(&self, runner: &dyn CommandRunner) -> Result<UpdateReport>;
    fn apply(&self, runner: &dyn CommandRunner) -> Result<()>;
    /// Whether `apply` can succeed with the privileges this process holds.
    fn can_apply(&self) -> bool {
        true
    }
}

pub struct UnsupportedChecker {
    os: String,
}

impl UnsupportedChecker {
    pub fn new(os: impl Into<String>) -> Self {
        UnsupportedChecker { os: os.into() }
    }
}

impl UpdateChecker for UnsupportedChecker {
    fn name(&self) -> &'static str {
        "unsupported"
    }

    fn check(&self, _runner: &dyn CommandRunner) -> Result<UpdateReport> {
        Err(AnalyzerError::UnsupportedPlatform {
            os: self.os.clone(),
        })
    }

    fn apply(&self, _runner: &dyn CommandRunner) -> Result<()> {
        Err(AnalyzerError::UnsupportedPlatform {
            os: self.os.clone(),
        })
    }

    fn can_apply(&self) -> bool {
        false
    }
}

pub fn select_update_checker(facts: &PlatformFacts) -> Box<dyn UpdateChecker> {
    match facts.os.as_str() {
        "linux" if facts.is_raspberry_pi() => {
            Box::new(AptChecker::raspberry_pi(facts.elevated))
        }
        "linux" => Box::new(AptChecker::debian(facts.elevated)),
        "macos" => Box::new(SoftwareUpdateChecker),
        "windows" => Box::new(WindowsUpdateChecker::new(facts.elevated)),
        other => Box::new(UnsupportedChecker::new(other)),
    }
}
