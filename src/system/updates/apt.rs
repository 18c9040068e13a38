use super::{UpdateChecker, UpdateReport};
use crate::error::{AnalyzerError, Result};
use crate::system::command::{CommandRunner, CommandSpec};

/// Debian-family checker. Raspberry Pi OS uses the `apt` front end, everything
/// else `apt-get`; both need root to refresh the package index.
pub struct AptChecker {
    tool: &'static str,
    elevated: bool,
}

impl AptChecker {
    pub fn debian(elevated: bool) -> Self {
        AptChecker {
            tool: "apt-get",
            elevated,
        }
    }

    pub fn raspberry_pi(elevated: bool) -> Self {
        AptChecker {
            tool: "apt",
            elevated,
        }
    }

    fn require_root(&self, action: &str) -> Result<()> {
        if self.elevated {
            Ok(())
        } else {
            Err(AnalyzerError::insufficient_privilege(format!(
                "{action} with {}; run with sudo",
                self.tool
            )))
        }
    }
}

impl UpdateChecker for AptChecker {
    fn name(&self) -> &'static str {
        self.tool
    }

    fn check(&self, runner: &dyn CommandRunner) -> Result<UpdateReport> {
        self.require_root("check for updates")?;

        let refresh = CommandSpec::new(self.tool, &["update", "-qq"]);
        runner.run(&refresh)?.into_success(&refresh)?;

        let simulate = CommandSpec::new(self.tool, &["-s", "upgrade"]);
        let output = runner.run(&simulate)?.into_success(&simulate)?;
        Ok(UpdateReport {
            pending: count_pending_installs(&output.stdout),
        })
    }

    fn apply(&self, runner: &dyn CommandRunner) -> Result<()> {
        self.require_root("install updates")?;
        let upgrade = CommandSpec::new(self.tool, &["upgrade", "-y"]);
        runner.run(&upgrade)?.into_success(&upgrade)?;
        Ok(())
    }

    fn can_apply(&self) -> bool {
        self.elevated
    }
}

/// `apt-get -s upgrade` prints one `Inst <pkg> ...` line per package it would install.
fn count_pending_installs(simulation: &str) -> usize {
    simulation
        .lines()
        .filter(|line| line.starts_with("Inst "))
        .count()
}
