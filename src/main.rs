use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use pomodoro_timer::app::{AUTO_ADVANCE_DELAY, AppOptions};
use pomodoro_timer::headless::{self, HeadlessOptions};
use pomodoro_timer::pomodoro::config::{parse_count, parse_duration};
use pomodoro_timer::pomodoro::{SessionConfig, TICK_UNIT};
use pomodoro_timer::{logging, tui};

/// Pomodoro timer with work intervals, short breaks and a long break every few cycles
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// work interval: minutes ("25") or units ("25m", "1h", "90s") [default: 20]
    #[arg(short, long, value_parser = parse_duration)]
    work: Option<Duration>,

    /// short break length, same syntax as --work [default: 5]
    #[arg(short, long, value_parser = parse_duration)]
    short_break: Option<Duration>,

    /// long break length, same syntax as --work [default: 15]
    #[arg(short, long, value_parser = parse_duration)]
    long_break: Option<Duration>,

    /// short breaks taken before the next break is a long one [default: 4]
    #[arg(short = 'n', long, value_parser = parse_count)]
    breaks_before_long: Option<u32>,

    /// run without the terminal UI, printing one JSON event per line
    #[arg(long)]
    headless: bool,

    /// log file (the UI always logs to a file; headless logs to stderr by default)
    #[arg(short = 'o', long = "log")]
    log: Option<PathBuf>,

    /// debug-level logging
    #[arg(short, long)]
    verbose: bool,

    /// do not send desktop notifications when a phase ends
    #[arg(long)]
    no_notify: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let defaults = SessionConfig::default();
    let config = SessionConfig::new(
        cli.work.unwrap_or(defaults.work_duration),
        cli.short_break.unwrap_or(defaults.short_break_duration),
        cli.long_break.unwrap_or(defaults.long_break_duration),
        cli.breaks_before_long.unwrap_or(defaults.short_breaks_before_long),
    )?;

    if cli.headless {
        logging::init(cli.log.as_deref(), cli.verbose)?;
        tracing::info!(?config, "starting headless");
        let options = HeadlessOptions {
            tick_period: TICK_UNIT,
            advance_delay: AUTO_ADVANCE_DELAY,
            notify: !cli.no_notify,
        };
        let shutdown = headless::shutdown_on(tokio::signal::ctrl_c());
        return headless::run(config, options, &mut std::io::stdout(), shutdown).await;
    }

    let log_path = cli.log.unwrap_or_else(logging::default_log_path);
    logging::init(Some(log_path.as_path()), cli.verbose)?;
    tracing::info!(?config, log = %log_path.display(), "starting terminal ui");

    tui::run(
        config,
        AppOptions {
            notify: !cli.no_notify,
            ..AppOptions::default()
        },
    )
    .await
}
