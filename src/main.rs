use anyhow::{bail, Context, Result};
use chrono::{DateTime, FixedOffset};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use std::io::IsTerminal;
use std::path::PathBuf;

use liftrs::config::AppConfig;
use liftrs::display;
use liftrs::logging::init_logging;
use liftrs::{FileSessionSource, LiftError, SessionRecord, SessionSource, StatsCalculator, StatsSnapshot};

/// liftrs - Workout streak and calendar statistics
///
/// Reads an exported session history and reports weekly-goal streaks,
/// the current week and the current month at a glance.
#[derive(Parser)]
#[command(name = "liftrs")]
#[command(version)]
#[command(about = "Workout streak and calendar statistics", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct HistoryArgs {
    /// Session history file (JSON or CSV) or a directory of them
    #[arg(short, long, value_name = "PATH")]
    sessions: Option<PathBuf>,

    /// Evaluate as of this instant (RFC 3339) instead of the local clock
    #[arg(long, value_name = "RFC3339")]
    now: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show streaks, the current week and the current month
    Stats {
        #[command(flatten)]
        history: HistoryArgs,

        /// Sessions per week needed to keep a streak going
        #[arg(short, long)]
        goal: Option<u32>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show the Monday-to-Sunday strip of the current week
    Week {
        #[command(flatten)]
        history: HistoryArgs,
    },

    /// Show the calendar of the current month
    Month {
        #[command(flatten)]
        history: HistoryArgs,
    },

    /// Show session counts for recent weeks
    History {
        #[command(flatten)]
        history: HistoryArgs,

        /// Number of weeks to show
        #[arg(short, long)]
        weeks: Option<u16>,

        /// Sessions per week needed to meet the goal
        #[arg(short, long)]
        goal: Option<u32>,
    },

    /// Configure application settings
    Config {
        /// List all configuration options
        #[arg(short, long)]
        list: bool,

        /// Set a configuration value (KEY=VALUE)
        #[arg(short, long, value_name = "KEY=VALUE")]
        set: Option<String>,

        /// Get a configuration value
        #[arg(short, long, value_name = "KEY")]
        get: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        let message = match e.downcast_ref::<LiftError>() {
            Some(lift_error) => lift_error.user_message(),
            None => format!("{:#}", e),
        };
        eprintln!("{} {}", "error:".red().bold(), message);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_config_path);
    let mut config = AppConfig::load_or_default_from(&config_path);

    let mut log_config = config.logging.clone();
    log_config.level = log_config.level.raised_by(cli.verbose);
    init_logging(&log_config).context("Failed to initialize logging")?;

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Stats {
            history,
            goal,
            format,
        } => {
            let goal = goal.unwrap_or(config.stats.weekly_goal);
            let snapshot = compute_snapshot(&config, &history, goal, None)?;

            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&snapshot)?);
                }
                OutputFormat::Table => {
                    print!("{}", display::render_summary(&snapshot));
                    println!();
                    print!("{}", display::render_week_strip(&snapshot));
                    println!();
                    print!("{}", display::render_month_grid(&snapshot));
                }
            }
        }

        Commands::Week { history } => {
            let snapshot = compute_snapshot(&config, &history, config.stats.weekly_goal, None)?;
            print!("{}", display::render_week_strip(&snapshot));
        }

        Commands::Month { history } => {
            let snapshot = compute_snapshot(&config, &history, config.stats.weekly_goal, None)?;
            print!("{}", display::render_month_grid(&snapshot));
        }

        Commands::History {
            history,
            weeks,
            goal,
        } => {
            let goal = goal.unwrap_or(config.stats.weekly_goal);
            let snapshot = compute_snapshot(&config, &history, goal, weeks)?;
            println!("{}", display::render_recent_weeks(&snapshot));
        }

        Commands::Config { list, set, get } => {
            if list {
                for (key, value) in config.list_values() {
                    println!("{} = {}", key.bold(), value);
                }
            } else if let Some(key_value) = set {
                let Some((key, value)) = key_value.split_once('=') else {
                    bail!("Expected KEY=VALUE, got '{}'", key_value);
                };
                config.set_value(key.trim(), value.trim())?;
                config
                    .save_to_file(&config_path)
                    .with_context(|| format!("Failed to save {}", config_path.display()))?;
                println!("{} {} = {}", "✓".green(), key.trim(), value.trim());
            } else if let Some(key) = get {
                println!("{}", config.get_value(&key)?);
            } else {
                println!("Config file: {}", config_path.display());
            }
        }
    }

    Ok(())
}

fn load_sessions(config: &AppConfig, history: &HistoryArgs) -> Result<Vec<SessionRecord>> {
    let Some(path) = history
        .sessions
        .clone()
        .or_else(|| config.import.sessions_file.clone())
    else {
        bail!("No session history given. Pass --sessions or set import.sessions_file");
    };

    // One load per invocation, so the file is read directly rather than through a SessionCache
    Ok(FileSessionSource::new(path).load_sessions()?)
}

fn parse_now(raw: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw).with_context(|| format!("Invalid --now value '{}'", raw))
}

fn compute_snapshot(
    config: &AppConfig,
    history: &HistoryArgs,
    goal: u32,
    history_weeks: Option<u16>,
) -> Result<StatsSnapshot> {
    let sessions = load_sessions(config, history)?;

    let mut stats_config = config.stats.clone();
    if let Some(weeks) = history_weeks {
        stats_config.history_weeks = weeks;
    }
    let calculator = StatsCalculator::with_config(stats_config);

    let snapshot = match history.now.as_deref() {
        Some(raw) => calculator.compute(&sessions, goal, &parse_now(raw)?),
        None => calculator.compute_now(&sessions, goal),
    };

    Ok(snapshot)
}
