mod common;

use std::io::Cursor;
use std::time::Duration;

use common::{CountingBandwidth, RecordingNotifier, quiet_settings, temp_output};
use system_analyzer::app::{Outcome, Session, Settings};
use system_analyzer::prompt::ConsoleOperator;
use system_analyzer::report::Thresholds;
use system_analyzer::system::builder::{RecordingObserver, Services, SnapshotBuilder};
use system_analyzer::system::collector::Collector;
use system_analyzer::system::command::ScriptedRunner;
use system_analyzer::system::latency::HttpProbe;
use system_analyzer::system::platform::PlatformFacts;
use system_analyzer::system::updates::UnsupportedChecker;

fn run(settings: &Settings, notifier: &RecordingNotifier) -> Outcome {
    let probe = HttpProbe::new(Duration::from_secs(1)).expect("http client");
    let updates = UnsupportedChecker::new("test-os");
    let runner = ScriptedRunner::default();
    let bandwidth = CountingBandwidth::failing();
    let observer = RecordingObserver::default();
    let mut builder = SnapshotBuilder::new(
        Collector::default(),
        PlatformFacts::detect(),
        Services {
            probe: &probe,
            updates: &updates,
            runner: &runner,
            bandwidth: &bandwidth,
            observer: &observer,
        },
    );
    let mut operator = ConsoleOperator::new(Cursor::new(""), Vec::new());
    let mut out = Vec::new();
    let outcome = Session {
        settings,
        operator: &mut operator,
        notifier,
        out: &mut out,
    }
    .run(&mut builder)
    .expect("session runs");
    let _ = std::fs::remove_dir_all(settings.output.parent().unwrap());
    outcome
}

fn settings(name: &str, thresholds: Thresholds) -> Settings {
    let mut settings = quiet_settings(None, temp_output(name));
    settings.measure_latency = false;
    settings.notifications = true;
    settings.thresholds = thresholds;
    settings
}

#[test]
fn exceeded_threshold_sends_high_usage_notification() {
    let notifier = RecordingNotifier::default();
    let below_everything = Thresholds {
        cpu: -1.0,
        memory: -1.0,
        disk: -1.0,
    };
    let outcome = run(&settings("notify_high", below_everything), &notifier);

    assert_eq!(outcome.exit_code(), 0);
    let sent = notifier.sent.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "High Resource Usage");
    assert!(sent[0].message.starts_with("CPU: "));
}

#[test]
fn usage_under_threshold_stays_quiet() {
    let notifier = RecordingNotifier::default();
    let above_everything = Thresholds {
        cpu: 101.0,
        memory: 101.0,
        disk: 101.0,
    };
    run(&settings("notify_quiet", above_everything), &notifier);
    assert!(notifier.sent.borrow().is_empty());
}
