use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::config::Config;
use crate::error::{AnalyzerError, Result};
use crate::export::export_snapshot;
use crate::notify::{Notifier, high_usage};
use crate::prompt::{Operator, UnreachableChoice};
use crate::report::{Thresholds, render_snapshot};
use crate::system::builder::{LatencyResult, RunOptions, SnapshotBuilder, UnreachablePolicy};
use crate::system::snapshot::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Decision {
    Ask,
    Yes,
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnreachableMode {
    Ask,
    Continue,
    Retry,
    Abort,
}

fn parse_value<T: ValueEnum>(key: &str, raw: &str, fallback: T) -> T {
    match T::from_str(raw, true) {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(key, value = raw, "unrecognised config value, using default");
            fallback
        }
    }
}

/// Config and CLI flags merged into one set of session settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub target: Option<String>,
    pub measure_latency: bool,
    pub latency_timeout: Duration,
    pub on_unreachable: UnreachableMode,
    pub retry_target: Option<String>,
    pub check_updates: bool,
    pub apply_updates: Decision,
    pub speed_test: Decision,
    pub speed_test_command: String,
    pub speed_test_timeout: Duration,
    pub output: PathBuf,
    pub color: bool,
    pub disk_mount: PathBuf,
    pub thresholds: Thresholds,
    pub notifications: bool,
    pub desktop_notifications: bool,
}

impl Settings {
    pub fn from_config(config: &Config) -> Self {
        Settings {
            target: None,
            measure_latency: config.latency.enabled,
            latency_timeout: Duration::from_secs(config.latency.timeout_secs),
            on_unreachable: parse_value(
                "latency.on_unreachable",
                &config.latency.on_unreachable,
                UnreachableMode::Ask,
            ),
            retry_target: None,
            check_updates: config.updates.enabled,
            apply_updates: parse_value("updates.apply", &config.updates.apply, Decision::Ask),
            speed_test: parse_value("bandwidth.run", &config.bandwidth.run, Decision::Ask),
            speed_test_command: config.bandwidth.command.clone(),
            speed_test_timeout: Duration::from_secs(config.bandwidth.timeout_secs),
            output: config.general.output.clone(),
            color: config.general.color,
            disk_mount: config.general.disk_mount.clone(),
            thresholds: Thresholds {
                cpu: config.thresholds.cpu,
                memory: config.thresholds.memory,
                disk: config.thresholds.disk,
            },
            notifications: config.notifications.enabled,
            desktop_notifications: config.notifications.desktop,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed(Box<Snapshot>),
    /// The target (or its replacement) never answered and the run stopped.
    Unreachable { target: String },
    /// The operator gave an answer the unreachable prompt does not understand.
    InvalidChoice,
}

impl Outcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Completed(_) => 0,
            Outcome::Unreachable { .. } | Outcome::InvalidChoice => 1,
        }
    }
}

pub struct Session<'a> {
    pub settings: &'a Settings,
    pub operator: &'a mut dyn Operator,
    pub notifier: &'a dyn Notifier,
    pub out: &'a mut dyn Write,
}

impl Session<'_> {
    /// gather -> present -> export. Prompts only happen here, never inside the builder.
    pub fn run(&mut self, builder: &mut SnapshotBuilder<'_>) -> Result<Outcome> {
        let target = self.resolve_target()?;

        let snapshot = match (target, self.preset_policy()) {
            (Some(target), Some(policy)) => {
                let options = self.decide_options(policy, builder.can_apply_updates());
                match builder.build(Some(target.as_str()), &options) {
                    Ok(snapshot) => snapshot,
                    Err(AnalyzerError::Unreachable { target }) => {
                        return self.stop_unreachable(target);
                    }
                    Err(e) => return Err(e),
                }
            }
            (target, _) => {
                let (latency, policy) = match self.latency_phase(builder, target)? {
                    LatencyPhase::Done { latency, policy } => (latency, policy),
                    LatencyPhase::Stopped(outcome) => return Ok(outcome),
                };
                let options = self.decide_options(policy, builder.can_apply_updates());
                builder.finish(latency, &options)
            }
        };

        writeln!(
            self.out,
            "{}",
            render_snapshot(&snapshot, &self.settings.thresholds, self.settings.color)
        )?;

        export_snapshot(&snapshot, &self.settings.output)?;
        tracing::info!(path = %self.settings.output.display(), "results exported");

        self.notify_if_high(&snapshot);
        Ok(Outcome::Completed(Box::new(snapshot)))
    }

    /// `None` when response time is disabled or the operator gave no target.
    fn resolve_target(&mut self) -> Result<Option<String>> {
        if !self.settings.measure_latency {
            return Ok(None);
        }
        if let Some(target) = &self.settings.target {
            return Ok(Some(target.clone()));
        }
        match self.operator.ask_target() {
            Some(target) => Ok(Some(target)),
            None => {
                writeln!(self.out, "No URL given. Skipping response time.")?;
                Ok(None)
            }
        }
    }

    /// Policy fixed by config or flags before anything is probed. `None` means the
    /// operator is asked once the target has failed.
    fn preset_policy(&self) -> Option<UnreachablePolicy> {
        match self.settings.on_unreachable {
            UnreachableMode::Continue => Some(UnreachablePolicy::Continue),
            UnreachableMode::Abort => Some(UnreachablePolicy::Abort),
            UnreachableMode::Retry => self
                .settings
                .retry_target
                .clone()
                .map(UnreachablePolicy::Retry),
            UnreachableMode::Ask => None,
        }
    }

    fn stop_unreachable(&mut self, target: String) -> Result<Outcome> {
        writeln!(self.out, "The URL cannot be reached. Check your network.")?;
        Ok(Outcome::Unreachable { target })
    }

    fn latency_phase(
        &mut self,
        builder: &SnapshotBuilder<'_>,
        target: Option<String>,
    ) -> Result<LatencyPhase> {
        let Some(target) = target else {
            return Ok(LatencyPhase::Done {
                latency: None,
                policy: UnreachablePolicy::Continue,
            });
        };

        if let Some(ms) = builder.measure_latency(&target) {
            return Ok(LatencyPhase::Done {
                latency: Some(LatencyResult {
                    target,
                    response_time_ms: Some(ms),
                }),
                policy: UnreachablePolicy::Continue,
            });
        }

        let policy = match self.unreachable_policy(&target)? {
            Some(policy) => policy,
            None => {
                writeln!(self.out, "Invalid choice. Exiting.")?;
                return Ok(LatencyPhase::Stopped(Outcome::InvalidChoice));
            }
        };

        match builder.resolve_unreachable(&target, &policy) {
            Ok(latency) => Ok(LatencyPhase::Done {
                latency: Some(latency),
                policy,
            }),
            Err(AnalyzerError::Unreachable { target }) => {
                self.stop_unreachable(target).map(LatencyPhase::Stopped)
            }
            Err(e) => Err(e),
        }
    }

    /// `None` means the operator's answer was not understood.
    fn unreachable_policy(&mut self, target: &str) -> Result<Option<UnreachablePolicy>> {
        if let Some(policy) = self.preset_policy() {
            return Ok(Some(policy));
        }
        let policy = match self.settings.on_unreachable {
            UnreachableMode::Ask => match self.operator.on_unreachable(target) {
                UnreachableChoice::Continue => {
                    writeln!(self.out, "Continuing with the rest of the checks.")?;
                    UnreachablePolicy::Continue
                }
                UnreachableChoice::Different(second) => UnreachablePolicy::Retry(second),
                UnreachableChoice::Invalid => return Ok(None),
            },
            // retry without a second target on the command line
            _ => match self.operator.ask_target() {
                Some(second) => UnreachablePolicy::Retry(second),
                None => UnreachablePolicy::Abort,
            },
        };
        Ok(Some(policy))
    }

    fn decide_options(
        &mut self,
        on_unreachable: UnreachablePolicy,
        can_apply: bool,
    ) -> RunOptions {
        let check_updates = self.settings.check_updates;
        let wants_apply = check_updates && self.settings.apply_updates != Decision::No;
        if wants_apply && !can_apply {
            let _ = writeln!(
                self.out,
                "Installing OS updates needs administrator privileges. Skipping installation."
            );
        }
        let apply_updates = wants_apply
            && can_apply
            && self.decide(
                self.settings.apply_updates,
                "Install OS updates if any are available?",
            );
        let run_bandwidth_test = self.decide(
            self.settings.speed_test,
            "Do you want to run a network speed test?",
        );
        if run_bandwidth_test {
            let _ = writeln!(
                self.out,
                "Running network speed test. This may take a few minutes..."
            );
        }
        RunOptions {
            on_unreachable,
            check_updates,
            apply_updates,
            run_bandwidth_test,
        }
    }

    fn decide(&mut self, decision: Decision, question: &str) -> bool {
        match decision {
            Decision::Yes => true,
            Decision::No => false,
            Decision::Ask => self.operator.confirm(question),
        }
    }

    fn notify_if_high(&self, snapshot: &Snapshot) {
        if !self.settings.notifications {
            return;
        }
        if self
            .settings
            .thresholds
            .exceeded(&snapshot.resources())
            .is_empty()
        {
            return;
        }
        self.notifier.send(&high_usage(
            snapshot.cpu_percent,
            snapshot.memory_percent,
            snapshot.disk_percent,
        ));
    }
}

enum LatencyPhase {
    Done {
        latency: Option<LatencyResult>,
        policy: UnreachablePolicy,
    },
    Stopped(Outcome),
}
