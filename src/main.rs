//! commitprobe - gNMI syslog capture and DB_COMMIT correlation
//!
//! Binary entry point for the command-line tool.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::WrapErr;

use commitprobe::cli::{AnalyzeArgs, Cli, Commands, RunArgs, SubscribeArgs, TriggerArgs};
use commitprobe::config::Settings;
use commitprobe::doctor::{self, CheckStatus, CheckTally};
use commitprobe::gnmi::{GnmicCommand, Subscriber, capture_path};
use commitprobe::orchestrator::{RunRequest, latest_log_file, run_workflow};
use commitprobe::report::write_report;
use commitprobe::ssh::{CommitTrigger, SshShell, SshTarget};
use commitprobe::syslog::{Correlation, correlate_file};

const SEPARATOR_WIDTH: usize = 60;

fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let mut settings = Settings::load_or_default(&cli.config)?;

    match &cli.command {
        Commands::Subscribe(args) => subscribe(&mut settings, args),
        Commands::Trigger(args) => trigger(&mut settings, args),
        Commands::Run(args) => run(&mut settings, args, cli.verbose),
        Commands::Analyze(args) => analyze(&settings, args, cli.verbose),
        Commands::ShowConfig => {
            println!("{}", settings.to_display_json()?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Doctor => Ok(run_doctor(&cli.config, &settings)),
    }
}

/// Logs go to stderr; `RUST_LOG` wins over the verbosity flags
fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let default = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn subscribe(settings: &mut Settings, args: &SubscribeArgs) -> color_eyre::Result<ExitCode> {
    args.apply(settings);
    let command = GnmicCommand::from_settings(settings, args.address.as_deref())?;
    let output = settings
        .gnmi
        .output_file
        .clone()
        .unwrap_or_else(|| capture_path(&settings.results_dir, &chrono::Local::now()));

    let summary = Subscriber::new(command, settings.capture_duration(), output).run()?;
    println!(
        "Captured {} messages in {:.1}s -> {}",
        summary.messages,
        summary.elapsed.as_secs_f64(),
        summary.output.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn trigger(settings: &mut Settings, args: &TriggerArgs) -> color_eyre::Result<ExitCode> {
    args.apply(settings);
    let commit_trigger = CommitTrigger::from_settings(&settings.ssh)?;
    let target = SshTarget::from_settings(settings, args.address.as_deref(), None)?;
    let mut shell = SshShell::connect(&target)?;
    let summary = commit_trigger.run(&mut shell)?;

    println!("Commits performed: {}", summary.commits());
    if let (Some(avg), Some(min), Some(max)) = (summary.average(), summary.min(), summary.max()) {
        println!(
            "Commit time: avg {:.3}s, min {:.3}s, max {:.3}s",
            avg.as_secs_f64(),
            min.as_secs_f64(),
            max.as_secs_f64()
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn run(settings: &mut Settings, args: &RunArgs, verbose: bool) -> color_eyre::Result<ExitCode> {
    args.apply(settings);
    let request = RunRequest {
        capture: args.output.clone(),
        report: args.report.clone(),
        json: args.json,
    };
    let run = run_workflow(settings, &request)?;

    println!("{}", "=".repeat(SEPARATOR_WIDTH));
    println!("Run summary");
    println!("{}", "=".repeat(SEPARATOR_WIDTH));
    println!("gNMI subscription: {}", run.outcome.capture.describe());
    println!("SSH commits:       {}", run.outcome.trigger.describe());
    println!("Capture file:      {}", run.capture.display());

    if let Some(correlation) = &run.correlation {
        print_correlation(correlation, &run.written, verbose);
    }

    if run.is_complete() {
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Run incomplete");
        Ok(ExitCode::FAILURE)
    }
}

fn analyze(settings: &Settings, args: &AnalyzeArgs, verbose: bool) -> color_eyre::Result<ExitCode> {
    let input = match &args.input {
        Some(path) => path.clone(),
        None => {
            let dir = args.results_dir.as_ref().unwrap_or(&settings.results_dir);
            let latest = latest_log_file(dir)?;
            tracing::info!(path = %latest.display(), "using most recent capture");
            latest
        }
    };

    let correlation = correlate_file(&input)?;
    let written = write_report(&correlation.report, &args.output, args.json)
        .wrap_err_with(|| format!("failed to write report for {}", input.display()))?;

    print_correlation(&correlation, &written, verbose);
    Ok(ExitCode::SUCCESS)
}

fn print_correlation(correlation: &Correlation, written: &[PathBuf], verbose: bool) {
    let report = &correlation.report;

    println!("{}", "-".repeat(SEPARATOR_WIDTH));
    println!("DB_COMMIT entries: {}", report.total_entries);
    println!("Unique commit IDs: {}", report.unique_commits);
    println!("Duplicate IDs:     {}", report.duplicate_count);
    if verbose {
        println!("Lines read:        {}", correlation.lines_read);
        println!("Lines skipped:     {}", correlation.skipped);
        for dup in &report.duplicates {
            let lines: Vec<String> = dup
                .occurrences
                .iter()
                .map(|o| o.line_number.to_string())
                .collect();
            println!("  {} x{} (lines {})", dup.id, dup.count, lines.join(", "));
        }
    }
    for path in written {
        println!("Report: {}", path.display());
    }
}

fn run_doctor(config_path: &Path, settings: &Settings) -> ExitCode {
    let checks = doctor::run_checks(config_path, settings);

    let mut section = "";
    for check in &checks {
        if check.section != section {
            section = check.section;
            println!("\n{section}");
            println!("{}", "-".repeat(section.len()));
        }
        let label = match check.status {
            CheckStatus::Pass => "PASS",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Warn => "WARN",
        };
        println!("[{label}] {}: {}", check.name, check.message);
    }

    let tally = CheckTally::of(&checks);
    println!("\n{}", "=".repeat(SEPARATOR_WIDTH));
    println!(
        "Passed: {}  Failed: {}  Warnings: {}",
        tally.passed, tally.failed, tally.warnings
    );

    if tally.all_passed() {
        println!("All required checks passed");
        ExitCode::SUCCESS
    } else {
        println!("Some checks failed; fix the issues above before running");
        ExitCode::FAILURE
    }
}
