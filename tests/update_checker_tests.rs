mod common;

use std::time::Duration;

use common::CountingBandwidth;
use system_analyzer::AnalyzerError;
use system_analyzer::system::builder::{
    BuildEvent, RecordingObserver, Services, SnapshotBuilder, UpdateOutcome,
};
use system_analyzer::system::collector::Collector;
use system_analyzer::system::command::{CommandOutput, CommandRunner, ScriptedRunner};
use system_analyzer::system::latency::HttpProbe;
use system_analyzer::system::platform::PlatformFacts;
use system_analyzer::system::updates::{
    AptChecker, SoftwareUpdateChecker, UnsupportedChecker, UpdateChecker, WindowsUpdateChecker,
    select_update_checker,
};

fn check_with(
    checker: &dyn UpdateChecker,
    runner: &dyn CommandRunner,
    apply: bool,
) -> (UpdateOutcome, Vec<BuildEvent>) {
    let probe = HttpProbe::new(Duration::from_secs(1)).expect("http client");
    let bandwidth = CountingBandwidth::failing();
    let observer = RecordingObserver::default();
    let builder = SnapshotBuilder::new(
        Collector::default(),
        PlatformFacts::detect(),
        Services {
            probe: &probe,
            updates: checker,
            runner,
            bandwidth: &bandwidth,
            observer: &observer,
        },
    );
    let outcome = builder.check_update_availability(apply);
    (outcome, observer.events())
}

fn spawn_failure() -> ScriptedRunner {
    ScriptedRunner::new(vec![
        Err(AnalyzerError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "program not found",
        ))),
    ])
}

fn all_checkers() -> Vec<Box<dyn UpdateChecker>> {
    vec![
        Box::new(AptChecker::debian(true)),
        Box::new(AptChecker::raspberry_pi(true)),
        Box::new(SoftwareUpdateChecker),
        Box::new(WindowsUpdateChecker::new(true)),
        Box::new(UnsupportedChecker::new("plan9")),
    ]
}

#[test]
fn every_branch_resolves_to_false_when_the_subprocess_fails() {
    for checker in all_checkers() {
        let (outcome, events) = check_with(checker.as_ref(), &spawn_failure(), true);
        assert!(!outcome.available, "{} reported updates", checker.name());
        assert!(!outcome.installed);
        assert!(matches!(
            events.as_slice(),
            [BuildEvent::UpdateCheckFailed { .. }]
        ));
    }
}

#[test]
fn non_zero_exit_is_no_updates() {
    for checker in all_checkers() {
        let runner = ScriptedRunner::new(vec![
            Ok(CommandOutput::failed(1, "error")),
            Ok(CommandOutput::failed(1, "error")),
        ]);
        let (outcome, _) = check_with(checker.as_ref(), &runner, false);
        assert!(!outcome.available, "{} reported updates", checker.name());
    }
}

#[test]
fn unprivileged_linux_fails_closed() {
    let runner = ScriptedRunner::default();
    let (outcome, events) = check_with(&AptChecker::raspberry_pi(false), &runner, true);
    assert_eq!(outcome, UpdateOutcome::default());
    assert_eq!(runner.call_count(), 0);
    match events.as_slice() {
        [BuildEvent::UpdateCheckFailed { error, .. }] => assert!(error.contains("sudo")),
        other => panic!("unexpected events: {other:?}"),
    }
}

#[test]
fn available_updates_are_applied_only_when_asked() {
    let simulation = "Inst openssl [3.0.11-1] (3.0.13-1 Debian:12/stable [amd64])\n";

    let runner = ScriptedRunner::new(vec![
        Ok(CommandOutput::ok("")),
        Ok(CommandOutput::ok(simulation)),
    ]);
    let (outcome, _) = check_with(&AptChecker::debian(true), &runner, false);
    assert_eq!(
        outcome,
        UpdateOutcome {
            available: true,
            installed: false
        }
    );
    assert_eq!(runner.call_count(), 2);

    let runner = ScriptedRunner::new(vec![
        Ok(CommandOutput::ok("")),
        Ok(CommandOutput::ok(simulation)),
        Ok(CommandOutput::ok("")),
    ]);
    let (outcome, events) = check_with(&AptChecker::debian(true), &runner, true);
    assert!(outcome.available && outcome.installed);
    assert_eq!(runner.calls()[2].command_line(), "apt-get upgrade -y");
    assert!(events.contains(&BuildEvent::UpdatesApplied {
        checker: "apt-get",
        error: None
    }));
}

#[test]
fn failed_install_still_reports_available() {
    let runner = ScriptedRunner::new(vec![
        Ok(CommandOutput::ok("* Label: Safari17.5VenturaAuto-17.5\n")),
        Ok(CommandOutput::failed(1, "Password required")),
    ]);
    let (outcome, events) = check_with(&SoftwareUpdateChecker, &runner, true);
    assert!(outcome.available);
    assert!(!outcome.installed);
    assert!(events.iter().any(|e| matches!(
        e,
        BuildEvent::UpdatesApplied {
            error: Some(_),
            ..
        }
    )));
}

#[test]
fn unelevated_windows_install_is_refused() {
    let table = "Status KB Title\n------ -- -----\n------ KB5034441 Security Update\n";
    let runner = ScriptedRunner::new(vec![Ok(CommandOutput::ok(table))]);
    let (outcome, _) = check_with(&WindowsUpdateChecker::new(false), &runner, true);
    assert!(outcome.available);
    assert!(!outcome.installed);
    assert_eq!(runner.call_count(), 1);
}

#[test]
fn host_selection_never_panics() {
    let checker = select_update_checker(&PlatformFacts::detect());
    assert!(!checker.name().is_empty());
}

#[test]
fn install_question_is_skipped_without_privilege() {
    use std::io::Cursor;
    use system_analyzer::app::{Decision, Session};
    use system_analyzer::prompt::ConsoleOperator;

    let probe = HttpProbe::new(Duration::from_secs(1)).expect("http client");
    let updates = AptChecker::debian(false);
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
    assert!(!builder.can_apply_updates());

    let output = common::temp_output("unprivileged_apply");
    let mut settings = common::quiet_settings(None, output.clone());
    settings.measure_latency = false;
    settings.check_updates = true;
    settings.apply_updates = Decision::Ask;

    // a "yes" that must never be consumed by the install question
    let mut operator = ConsoleOperator::new(Cursor::new("yes\n"), Vec::new());
    let notifier = common::RecordingNotifier::default();
    let mut out = Vec::new();
    Session {
        settings: &settings,
        operator: &mut operator,
        notifier: &notifier,
        out: &mut out,
    }
    .run(&mut builder)
    .expect("session runs");

    let transcript = String::from_utf8(operator.into_output()).unwrap();
    assert!(!transcript.contains("Install OS updates"));
    assert!(String::from_utf8(out).unwrap().contains("administrator privileges"));
    assert_eq!(runner.call_count(), 0);
    let _ = std::fs::remove_dir_all(output.parent().unwrap());
}
