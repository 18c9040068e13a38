use super::{UpdateChecker, UpdateReport};
use crate::error::Result;
use crate::system::command::{CommandRunner, CommandSpec};

pub struct SoftwareUpdateChecker;

impl UpdateChecker for SoftwareUpdateChecker {
    fn name(&self) -> &'static str {
        "softwareupdate"
    }

    fn check(&self, runner: &dyn CommandRunner) -> Result<UpdateReport> {
        let list = CommandSpec::new("softwareupdate", &["-l"]);
        let output = runner.run(&list)?.into_success(&list)?;
        // "No new software available." goes to stderr on most releases
        let combined = format!("{}\n{}", output.stdout, output.stderr);
        Ok(UpdateReport {
            pending: count_labels(&combined),
        })
    }

    fn apply(&self, runner: &dyn CommandRunner) -> Result<()> {
        let install = CommandSpec::new("softwareupdate", &["-i", "-a"]);
        runner.run(&install)?.into_success(&install)?;
        Ok(())
    }
}

fn count_labels(listing: &str) -> usize {
    if listing.contains("No new software available") {
        return 0;
    }
    listing
        .lines()
        .map(str::trim_start)
        .filter(|line| line.starts_with("* "))
        .count()
}
