use super::{UpdateChecker, UpdateReport};
use crate::error::{AnalyzerError, Result};
use crate::system::command::{CommandRunner, CommandSpec};

/// Windows Update through the PSWindowsUpdate PowerShell module.
pub struct WindowsUpdateChecker {
    elevated: bool,
}

impl WindowsUpdateChecker {
    pub fn new(elevated: bool) -> Self {
        WindowsUpdateChecker { elevated }
    }
}

impl UpdateChecker for WindowsUpdateChecker {
    fn name(&self) -> &'static str {
        "Windows Update"
    }

    fn check(&self, runner: &dyn CommandRunner) -> Result<UpdateReport> {
        let query = CommandSpec::new(
            "powershell",
            &["-NoProfile", "-Command", "Get-WindowsUpdate"],
        );
        let output = runner.run(&query)?.into_success(&query)?;
        Ok(UpdateReport {
            pending: count_update_rows(&output.stdout),
        })
    }

    fn apply(&self, runner: &dyn CommandRunner) -> Result<()> {
        if !self.elevated {
            return Err(AnalyzerError::insufficient_privilege(
                "install Windows updates; run from an elevated prompt",
            ));
        }
        let install = CommandSpec::new(
            "powershell",
            &["-NoProfile", "-Command", "Install-WindowsUpdate", "-AcceptAll"],
        );
        runner.run(&install)?.into_success(&install)?;
        Ok(())
    }

    fn can_apply(&self) -> bool {
        self.elevated
    }
}

/// `Get-WindowsUpdate` renders a table: a header row, a dashed rule, then one row per update.
fn count_update_rows(table: &str) -> usize {
    let mut lines = table.lines().filter(|line| !line.trim().is_empty());
    let has_rule = lines
        .by_ref()
        .take(2)
        .any(|line| line.trim_start().starts_with("--"));
    if !has_rule {
        return 0;
    }
    lines.count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_rows_below_the_rule() {
        let table = "
ComputerName Status     KB          Size Title
------------ ------     --          ---- -----
DESKTOP-01   -------    KB5034441  438MB Security Update for Windows
DESKTOP-01   -------    KB890830    80MB Windows Malicious Software Removal Tool
";
        assert_eq!(count_update_rows(table), 2);
    }

    #[test]
    fn empty_output_means_none() {
        assert_eq!(count_update_rows(""), 0);
        assert_eq!(count_update_rows("\r\n\r\n"), 0);
    }
}
