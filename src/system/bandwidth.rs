use std::time::Duration;

use serde::Deserialize;

use super::command::{CommandRunner, CommandSpec, SystemCommandRunner};
use super::snapshot::Bandwidth;
use crate::error::{AnalyzerError, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

pub trait BandwidthClient {
    fn measure(&self) -> Result<Bandwidth>;
}

/// Drives the `speedtest-cli` client and reads its `--json` report.
pub struct SpeedtestCli<R = SystemCommandRunner> {
    runner: R,
    program: String,
    timeout: Duration,
}

impl SpeedtestCli {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self::with_runner(SystemCommandRunner, program, timeout)
    }
}

impl<R: CommandRunner> SpeedtestCli<R> {
    pub fn with_runner(runner: R, program: impl Into<String>, timeout: Duration) -> Self {
        SpeedtestCli {
            runner,
            program: program.into(),
            timeout,
        }
    }
}

impl<R: CommandRunner> BandwidthClient for SpeedtestCli<R> {
    fn measure(&self) -> Result<Bandwidth> {
        let spec =
            CommandSpec::new(&self.program, &["--json", "--secure"]).with_timeout(self.timeout);
        let output = self.runner.run(&spec)?.into_success(&spec)?;
        parse_report(&self.program, &output.stdout)
    }
}

#[derive(Debug, Deserialize)]
struct SpeedtestReport {
    /// bits per second
    download: f64,
    upload: f64,
}

fn parse_report(program: &str, stdout: &str) -> Result<Bandwidth> {
    let report: SpeedtestReport = serde_json::from_str(stdout.trim())
        .map_err(|e| AnalyzerError::invalid_output(program, e.to_string()))?;
    if !report.download.is_finite() || !report.upload.is_finite() {
        return Err(AnalyzerError::invalid_output(program, "non-finite speed"));
    }
    Ok(Bandwidth {
        download_mbps: report.download / 1_000_000.0,
        upload_mbps: report.upload / 1_000_000.0,
    })
}
