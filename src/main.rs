use std::io::stdout;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use system_analyzer::app::{Decision, Session, Settings, UnreachableMode};
use system_analyzer::config::{self, load_config, load_config_from_path};
use system_analyzer::logging;
use system_analyzer::notify::default_notifier;
use system_analyzer::prompt::ConsoleOperator;
use system_analyzer::system::bandwidth::SpeedtestCli;
use system_analyzer::system::builder::{Services, SnapshotBuilder, TracingObserver};
use system_analyzer::system::collector::{Collector, platform_string};
use system_analyzer::system::command::SystemCommandRunner;
use system_analyzer::system::latency::HttpProbe;
use system_analyzer::system::platform::PlatformFacts;
use system_analyzer::system::updates::select_update_checker;

#[derive(Parser)]
#[command(
    name = "system-analyzer",
    version,
    about = "Snapshot of system resource usage, response time, OS updates and bandwidth"
)]
struct Cli {
    /// URL or host to measure response time against (prompted for when omitted)
    target: Option<String>,

    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// What to do when the target does not answer
    #[arg(long, value_enum)]
    on_unreachable: Option<UnreachableMode>,

    /// Second target for --on-unreachable retry
    #[arg(long)]
    retry_target: Option<String>,

    /// Run the bandwidth speed test
    #[arg(long, value_enum)]
    speed_test: Option<Decision>,

    /// Install OS updates when some are available
    #[arg(long, value_enum)]
    apply_updates: Option<Decision>,

    /// Do not query the package manager
    #[arg(long, default_value_t = false)]
    skip_updates: bool,

    /// Do not measure response time
    #[arg(long, default_value_t = false)]
    no_latency: bool,

    /// JSON results file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Disable coloured table output
    #[arg(long, default_value_t = false)]
    no_color: bool,

    /// Log file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version are not usage errors
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            return Ok(ExitCode::from(code));
        }
    };

    let config = load_config_for_cli(&cli);
    logging::init(&config.general.log_file, &config.general.log_level)?;
    let settings = settings_for_cli(&config, cli);

    let session = tokio::task::spawn_blocking(move || run_session(&settings));
    tokio::select! {
        joined = session => {
            let code = joined.map_err(|e| eyre!("session task failed: {e}"))??;
            Ok(ExitCode::from(code))
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted by operator");
            println!("\nExiting system analyzer...");
            // the blocking session may sit in a read or a subprocess; do not wait for it
            std::process::exit(0);
        }
    }
}

fn load_config_for_cli(cli: &Cli) -> config::Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(ref path) = cli.log_file {
        config.general.log_file = path.clone();
    }
    if let Some(ref path) = cli.output {
        config.general.output = path.clone();
    }
    if cli.no_color {
        config.general.color = false;
    }
    if cli.no_latency {
        config.latency.enabled = false;
    }
    if cli.skip_updates {
        config.updates.enabled = false;
    }

    config
}

fn settings_for_cli(config: &config::Config, cli: Cli) -> Settings {
    let mut settings = Settings::from_config(config);
    settings.target = cli.target;
    settings.retry_target = cli.retry_target;
    if let Some(mode) = cli.on_unreachable {
        settings.on_unreachable = mode;
    }
    if let Some(decision) = cli.speed_test {
        settings.speed_test = decision;
    }
    if let Some(decision) = cli.apply_updates {
        settings.apply_updates = decision;
    }
    settings
}

fn run_session(settings: &Settings) -> Result<u8> {
    let mut collector = Collector::new(settings.disk_mount.clone());
    logging::log_startup(collector.current_user().as_deref(), &platform_string());

    let facts = PlatformFacts::detect();
    let updates = select_update_checker(&facts);
    tracing::info!(checker = updates.name(), os = %facts.os, "update checker selected");

    let probe = HttpProbe::new(settings.latency_timeout)?;
    let bandwidth = SpeedtestCli::new(
        settings.speed_test_command.clone(),
        settings.speed_test_timeout,
    );
    let observer = TracingObserver;
    let runner = SystemCommandRunner;

    let mut builder = SnapshotBuilder::new(
        collector,
        facts,
        Services {
            probe: &probe,
            updates: updates.as_ref(),
            runner: &runner,
            bandwidth: &bandwidth,
            observer: &observer,
        },
    );

    let mut operator = ConsoleOperator::stdio();
    let notifier = default_notifier(settings.desktop_notifications);
    let mut out = stdout();
    let mut session = Session {
        settings,
        operator: &mut operator,
        notifier: notifier.as_ref(),
        out: &mut out,
    };

    let outcome = session.run(&mut builder)?;
    tracing::info!(exit_code = outcome.exit_code(), "analyzer finished");
    Ok(outcome.exit_code())
}
