use std::fs::File;
use std::io::{self, BufReader, IsTerminal, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use periph_timer::TimerTester;
use periph_timer_port_host::{SimGpio, SimTimer};
use timer_shell::{Console, ShellConfig, BANNER};
use tracing_subscriber::EnvFilter;

/// Exit status after Ctrl-C, as a shell would report SIGINT.
const INTERRUPTED: i32 = 130;

#[derive(Parser, Debug)]
#[command(author, version, about = "Interactive test console for timer drivers")]
struct Opts {
    /// JSON file with board, timeout and simulated timer settings.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of simulated timer devices.
    #[arg(long)]
    devices: Option<usize>,

    /// Compare channels per simulated device.
    #[arg(long)]
    channels: Option<usize>,

    #[arg(long = "max-frequency", value_name = "HZ")]
    max_frequency: Option<u32>,

    /// Board name reported by `get_metadata`.
    #[arg(long)]
    board: Option<String>,

    /// Give up on a `timer_set` after this many milliseconds.
    #[arg(long = "wait-timeout-ms", value_name = "MS")]
    wait_timeout_ms: Option<u64>,

    /// Read commands from a file instead of stdin.
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Repeat each command before its output.
    #[arg(long)]
    echo: bool,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long = "log-level", default_value = "warn", value_name = "FILTER")]
    log_level: String,
}

impl Opts {
    /// File settings first, then command-line overrides.
    fn resolve_config(&self) -> Result<ShellConfig> {
        let mut config = match &self.config {
            Some(path) => ShellConfig::load(path)?,
            None => ShellConfig::default(),
        };
        if let Some(devices) = self.devices {
            config.timer.devices = devices;
        }
        if let Some(channels) = self.channels {
            config.timer.channels = channels;
        }
        if let Some(max_frequency) = self.max_frequency {
            config.timer.max_frequency = max_frequency;
        }
        if let Some(board) = &self.board {
            config.tester.board = board.clone();
        }
        if let Some(ms) = self.wait_timeout_ms {
            config.tester.wait_timeout = Some(Duration::from_millis(ms));
        }
        Ok(config)
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    init_logging(&opts.log_level);

    ctrlc::set_handler(|| process::exit(INTERRUPTED))
    .context("failed to install Ctrl-C handler")?;

    let config = opts.resolve_config()?;
    log::info!("simulated timer: {:?}", config.timer);

    let timer = Arc::new(SimTimer::new(config.timer.into()));
    let gpio = Arc::new(SimGpio::new());
    let tester = TimerTester::new(timer, gpio, config.tester)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{BANNER}")?;

    let console = Console::new(&tester).echo(opts.echo);
    let summary = match &opts.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open script {}", path.display()))?;
            console.run(BufReader::new(file), &mut out)?
        }
        None => {
            let stdin = io::stdin();
            let interactive = stdin.is_terminal();
            console.prompt(interactive).run(stdin.lock(), &mut out)?
        }
    };

    log::info!(
        "session ended: {} commands, {} failed",
        summary.commands,
        summary.failures
    );
    Ok(())
}
