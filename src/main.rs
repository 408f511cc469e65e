use agent_progress::{
    activity,
    config::{Config, Overrides},
    engine::RunOutcome,
    model::Report,
    sink::{self, Sink},
    watcher,
};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "agent-progress",
    version,
    about = "Aggregate live agent sessions and the agent registry into a progress report"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Config file (default: ./agent-progress.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Read sessions from this file instead of running the session command
    #[arg(long, global = true)]
    sessions_file: Option<PathBuf>,

    /// Agent registry JSON
    #[arg(long, global = true)]
    registry: Option<PathBuf>,

    /// Report output path
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Skip the session command and read the session file directly
    #[arg(long, global = true)]
    no_command: bool,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build one report and write it (default)
    Snapshot {
        /// Print the report JSON to stdout instead of the summary
        #[arg(long)]
        json: bool,
        /// Do not write the report
        #[arg(long)]
        dry_run: bool,
    },
    /// Rebuild the report on an interval and whenever an input file changes
    Watch {
        /// Refresh interval in seconds
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Analyse files touched today in the workspace
    Activity {
        #[arg(long)]
        workspace: Option<PathBuf>,
        #[arg(long)]
        sessions_dir: Option<PathBuf>,
        /// Print the analysis JSON to stdout instead of writing it
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_overrides(&Overrides {
        sessions_file: cli.sessions_file.clone(),
        registry: cli.registry.clone(),
        output: cli.output.clone(),
        no_command: cli.no_command,
    });

    match cli.command.unwrap_or(Command::Snapshot {
        json: false,
        dry_run: false,
    }) {
        Command::Snapshot { json, dry_run } => run_snapshot(&config, json, dry_run),
        Command::Watch { interval } => {
            if let Some(secs) = interval {
                config.watch.interval_secs = secs;
            }
            config.validate()?;
            run_watch(&config)
        }
        Command::Activity {
            workspace,
            sessions_dir,
            dry_run,
        } => {
            if let Some(dir) = workspace {
                config.activity.workspace = dir;
            }
            if let Some(dir) = sessions_dir {
                config.activity.sessions_dir = dir;
            }
            run_activity(&config, dry_run)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_snapshot(config: &Config, json: bool, dry_run: bool) -> Result<()> {
    let aggregator = config.aggregator();

    if dry_run {
        print_report(&aggregator.snapshot(), json)?;
        return Ok(());
    }

    let sink = config.sink();
    let outcome = aggregator.run(&sink);
    print_report(&outcome.report, json)?;

    match outcome.sink_error {
        None => Ok(()),
        Some(e) => Err(eyre!("report not written to {}: {}", sink.describe(), e)),
    }
}

fn run_watch(config: &Config) -> Result<()> {
    let aggregator = config.aggregator();
    let sink = config.sink();

    let targets = vec![config.registry.path.clone(), config.sessions.path.clone()];
    let watch = watcher::start_watching(&targets, config.watch_interval())
        .map_err(|e| eyre!("failed to start file watcher: {}", e))?;

    tracing::info!(
        interval_secs = config.watch.interval_secs,
        output = %sink.describe(),
        "watching for changes"
    );

    watcher::run_watch_loop(&aggregator, &sink, &watch.rx, |outcome: &RunOutcome| {
        println!("{}", summary_line(&outcome.report));
    });
    Ok(())
}

fn run_activity(config: &Config, dry_run: bool) -> Result<()> {
    let report = activity::analyze(
        &config.activity.workspace,
        &config.activity.sessions_dir,
        Local::now().date_naive(),
        Utc::now(),
    );

    if dry_run {
        println!("{}", sink::serialize_json(&report)?);
        return Ok(());
    }

    let path = sink::write_json(&config.activity.output, &report)?;
    println!("Files touched today: {}", report.total_files_created);
    println!("Session files: {}", report.active_sessions);
    for (area, pct) in &report.real_progress {
        println!("  {:<12} {:>3}%", format!("{area:?}"), pct);
    }
    println!("Saved to {}", path.display());
    Ok(())
}

fn print_report(report: &Report, json: bool) -> Result<()> {
    if json {
        println!("{}", sink::serialize_json(report)?);
    } else {
        print!("{}", format_summary(report));
    }
    Ok(())
}

fn summary_line(report: &Report) -> String {
    format!(
        "{} agents ({} active), average progress {:.1}%, {} alerts",
        report.total_agents,
        report.active_agents,
        report.average_progress,
        report.alerts.len()
    )
}

/// Human-readable report for the terminal.
fn format_summary(report: &Report) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Found {} agents ({} active)\n",
        report.total_agents, report.active_agents
    ));
    out.push_str(&format!("Average progress: {:.1}%\n", report.average_progress));

    if !report.alerts.is_empty() {
        out.push_str(&format!("\nALERTS ({}):\n", report.alerts.len()));
        for alert in &report.alerts {
            out.push_str(&format!("  ! {}\n", alert.message));
        }
    }

    out.push_str("\nAgents:\n");
    for agent in &report.agents {
        let marker = if agent.progress > 0 { '*' } else { '-' };
        out.push_str(&format!(
            "  {} {}: {}% - {} (ETA: {})\n",
            marker, agent.name, agent.progress, agent.task, agent.eta
        ));
    }
    out
}
