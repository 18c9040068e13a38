use std::cell::RefCell;
use std::time::{SystemTime, UNIX_EPOCH};

use super::bandwidth::BandwidthClient;
use super::collector::Collector;
use super::command::CommandRunner;
use super::latency::{LatencyProbe, duration_ms, normalize_target};
use super::platform::PlatformFacts;
use super::snapshot::{Bandwidth, NetworkCounters, ResourceUsage, Snapshot, SnapshotParts};
use super::updates::UpdateChecker;
use crate::error::{AnalyzerError, Result};

/// What to do when the first latency target does not answer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UnreachablePolicy {
    #[default]
    Continue,
    /// Probe this target once instead; the run fails if it is unreachable too.
    Retry(String),
    Abort,
}

/// Every operator decision, settled before the build starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub on_unreachable: UnreachablePolicy,
    pub check_updates: bool,
    pub apply_updates: bool,
    pub run_bandwidth_test: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            on_unreachable: UnreachablePolicy::Continue,
            check_updates: true,
            apply_updates: false,
            run_bandwidth_test: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BuildEvent {
    LatencyMeasured { target: String, millis: f64 },
    TargetUnreachable { target: String, error: String },
    RetryingWith { target: String },
    UpdatesChecked { checker: &'static str, pending: usize },
    UpdateCheckFailed { checker: &'static str, error: String },
    UpdatesApplied { checker: &'static str, error: Option<String> },
    ResourcesSampled(ResourceUsage),
    NetworkSampled(NetworkCounters),
    BandwidthMeasured(Bandwidth),
    BandwidthSkipped,
    BandwidthFailed { error: String },
}

/// Receives progress from the builder; the builder itself never logs.
pub trait SnapshotObserver {
    fn observe(&self, event: &BuildEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SnapshotObserver for TracingObserver {
    fn observe(&self, event: &BuildEvent) {
        match event {
            BuildEvent::LatencyMeasured { target, millis } => {
                tracing::info!(target_url = %target, millis, "response time measured")
            }
            BuildEvent::TargetUnreachable { target, error } => {
                tracing::error!(target_url = %target, %error, "error measuring system response")
            }
            BuildEvent::RetryingWith { target } => {
                tracing::info!(target_url = %target, "retrying with a different target")
            }
            BuildEvent::UpdatesChecked { checker, pending } => {
                tracing::info!(checker, pending, "update check finished")
            }
            BuildEvent::UpdateCheckFailed { checker, error } => {
                tracing::error!(checker, %error, "error checking for updates")
            }
            BuildEvent::UpdatesApplied {
                checker,
                error: None,
            } => tracing::info!(checker, "updates installed"),
            BuildEvent::UpdatesApplied {
                checker,
                error: Some(error),
            } => tracing::error!(checker, %error, "error installing updates"),
            BuildEvent::ResourcesSampled(usage) => tracing::info!(
                cpu = usage.cpu_percent,
                memory = usage.memory_percent,
                disk = usage.disk_percent,
                "resource usage sampled"
            ),
            BuildEvent::NetworkSampled(counters) => tracing::debug!(
                sent = counters.bytes_sent,
                received = counters.bytes_received,
                "network counters sampled"
            ),
            BuildEvent::BandwidthMeasured(bw) => tracing::info!(
                download_mbps = bw.download_mbps,
                upload_mbps = bw.upload_mbps,
                "speed test finished"
            ),
            BuildEvent::BandwidthSkipped => tracing::debug!("speed test skipped"),
            BuildEvent::BandwidthFailed { error } => {
                tracing::error!(%error, "speed test failed")
            }
        }
    }
}

/// Keeps every event; used by tests and by callers that want a run transcript.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: RefCell<Vec<BuildEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<BuildEvent> {
        self.events.borrow().clone()
    }
}

impl SnapshotObserver for RecordingObserver {
    fn observe(&self, event: &BuildEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LatencyResult {
    pub target: String,
    pub response_time_ms: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    pub available: bool,
    pub installed: bool,
}

/// Collaborators the builder reaches through narrow interfaces.
pub struct Services<'a> {
    pub probe: &'a dyn LatencyProbe,
    pub updates: &'a dyn UpdateChecker,
    pub runner: &'a dyn CommandRunner,
    pub bandwidth: &'a dyn BandwidthClient,
    pub observer: &'a dyn SnapshotObserver,
}

pub struct SnapshotBuilder<'a> {
    collector: Collector,
    facts: PlatformFacts,
    services: Services<'a>,
}

impl<'a> SnapshotBuilder<'a> {
    pub fn new(collector: Collector, facts: PlatformFacts, services: Services<'a>) -> Self {
        SnapshotBuilder {
            collector,
            facts,
            services,
        }
    }

    /// Whether installing updates could succeed; the operator is not asked otherwise.
    pub fn can_apply_updates(&self) -> bool {
        self.services.updates.can_apply()
    }

    /// One GET against `target`; `None` on any network error.
    pub fn measure_latency(&self, target: &str) -> Option<f64> {
        let url = normalize_target(target);
        match self.services.probe.probe(&url) {
            Ok(elapsed) => {
                let millis = duration_ms(elapsed);
                self.emit(BuildEvent::LatencyMeasured {
                    target: url,
                    millis,
                });
                Some(millis)
            }
            Err(error) => {
                self.emit(BuildEvent::TargetUnreachable {
                    target: url,
                    error: error.to_string(),
                });
                None
            }
        }
    }

    pub fn resolve_latency(
        &self,
        target: &str,
        policy: &UnreachablePolicy,
    ) -> Result<LatencyResult> {
        match self.measure_latency(target) {
            Some(ms) => Ok(LatencyResult {
                target: target.to_string(),
                response_time_ms: Some(ms),
            }),
            None => self.resolve_unreachable(target, policy),
        }
    }

    /// Applies `policy` after `target` has already failed to answer.
    pub fn resolve_unreachable(
        &self,
        target: &str,
        policy: &UnreachablePolicy,
    ) -> Result<LatencyResult> {
        match policy {
            UnreachablePolicy::Continue => Ok(LatencyResult {
                target: target.to_string(),
                response_time_ms: None,
            }),
            UnreachablePolicy::Abort => Err(AnalyzerError::unreachable(target)),
            UnreachablePolicy::Retry(second) => {
                self.emit(BuildEvent::RetryingWith {
                    target: second.clone(),
                });
                match self.measure_latency(second) {
                    Some(ms) => Ok(LatencyResult {
                        target: second.clone(),
                        response_time_ms: Some(ms),
                    }),
                    None => Err(AnalyzerError::unreachable(second.as_str())),
                }
            }
        }
    }

    /// Never fails: every error is reported to the observer and counts as "no updates".
    pub fn check_update_availability(&self, apply: bool) -> UpdateOutcome {
        let checker = self.services.updates;
        let report = match checker.check(self.services.runner) {
            Ok(report) => report,
            Err(error) => {
                self.emit(BuildEvent::UpdateCheckFailed {
                    checker: checker.name(),
                    error: error.to_string(),
                });
                return UpdateOutcome::default();
            }
        };
        self.emit(BuildEvent::UpdatesChecked {
            checker: checker.name(),
            pending: report.pending,
        });

        let mut outcome = UpdateOutcome {
            available: report.available(),
            installed: false,
        };
        if outcome.available && apply {
            let result = checker.apply(self.services.runner);
            outcome.installed = result.is_ok();
            self.emit(BuildEvent::UpdatesApplied {
                checker: checker.name(),
                error: result.err().map(|e| e.to_string()),
            });
        }
        outcome
    }

    pub fn sample_resource_usage(&mut self) -> ResourceUsage {
        let usage = self.collector.sample_resource_usage();
        self.emit(BuildEvent::ResourcesSampled(usage));
        usage
    }

    pub fn sample_network_counters(&self) -> NetworkCounters {
        let counters = self.collector.sample_network_counters();
        self.emit(BuildEvent::NetworkSampled(counters));
        counters
    }

    /// The client is only invoked when `enabled`.
    pub fn run_bandwidth_test(&self, enabled: bool) -> Option<Bandwidth> {
        if !enabled {
            self.emit(BuildEvent::BandwidthSkipped);
            return None;
        }
        match self.services.bandwidth.measure() {
            Ok(bw) => {
                self.emit(BuildEvent::BandwidthMeasured(bw));
                Some(bw)
            }
            Err(error) => {
                self.emit(BuildEvent::BandwidthFailed {
                    error: error.to_string(),
                });
                None
            }
        }
    }

    pub fn build(&mut self, target: Option<&str>, options: &RunOptions) -> Result<Snapshot> {
        let latency = match target {
            Some(target) => Some(self.resolve_latency(target, &options.on_unreachable)?),
            None => None,
        };
        Ok(self.finish(latency, options))
    }

    /// Everything after the latency phase. Infallible by construction.
    pub fn finish(&mut self, latency: Option<LatencyResult>, options: &RunOptions) -> Snapshot {
        let updates = if options.check_updates {
            self.check_update_availability(options.apply_updates)
        } else {
            UpdateOutcome::default()
        };
        let resources = self.sample_resource_usage();
        let network = self.sample_network_counters();
        let system = self.collector.system_info(&self.facts);
        let bandwidth = self.run_bandwidth_test(options.run_bandwidth_test);

        let (target, response_time_ms) = match latency {
            Some(l) => (Some(l.target), l.response_time_ms),
            None => (None, None),
        };

        Snapshot::from_parts(SnapshotParts {
            resources,
            network,
            target,
            response_time_ms,
            updates_available: updates.available,
            updates_installed: updates.installed,
            bandwidth,
            system,
            taken_at_unix_s: unix_now(),
        })
    }

    fn emit(&self, event: BuildEvent) {
        self.services.observer.observe(&event);
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
