#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use floating_widget::constants::defaults::FRAME_MS;
use floating_widget::context::ContextMonitor;
use floating_widget::render::{JsonLinesSurface, RecordingSurface, SurfaceWrite};
use floating_widget::scheduler::Millis;
use floating_widget::shortcuts::shortcut_list;
use floating_widget::{replay, EngineConfig, HostEvent, Widget, WidgetSnapshot};

#[derive(Parser)]
#[command(
    name = "floating-widget",
    about = "Adaptive behavior engine for a floating assistant widget"
)]
struct Cli {
    /// Config file (defaults to the user config dir)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed a recorded event script through the widget and print the final snapshot
    Replay {
        /// JSON array of events, each with an `at` timestamp in ms
        events: PathBuf,

        /// Pin the local hour instead of reading the clock
        #[arg(long)]
        hour: Option<u32>,

        /// Keep running timers and frames this long after the last event
        #[arg(long, default_value_t = 1000)]
        settle_ms: Millis,

        /// Include every surface write in the output
        #[arg(long)]
        writes: bool,
    },
    /// Read JSON-lines events from stdin and stream surface writes to stdout
    Live {
        /// Pin the local hour instead of reading the clock
        #[arg(long)]
        hour: Option<u32>,
    },
    /// Print the keyboard shortcut table
    Shortcuts,
}

#[derive(Serialize)]
struct ReplayOutput<'a> {
    end: Millis,
    snapshot: WidgetSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    writes: Option<&'a [SurfaceWrite]>,
}

fn init_logging() -> Result<()> {
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    // stdout carries JSON output
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn build_widget(config: &EngineConfig, hour: Option<u32>) -> Widget {
    match hour {
        Some(hour) => {
            info!(hour, "Using pinned hour");
            let monitor =
                ContextMonitor::with_hour_source(config.context.clone(), move || hour % 24);
            Widget::with_context_monitor(config, monitor)
        }
        None => Widget::new(config),
    }
}

fn run_replay(
    config: &EngineConfig,
    events: PathBuf,
    hour: Option<u32>,
    settle_ms: Millis,
    writes: bool,
) -> Result<()> {
    let script = replay::load_events(&events)?;
    let mut widget = build_widget(config, hour);
    let mut surface = RecordingSurface::new();

    let end = replay::replay(&mut widget, &script, &mut surface, settle_ms);

    let output = ReplayOutput {
        end,
        snapshot: widget.snapshot(),
        writes: writes.then_some(surface.writes.as_slice()),
    };
    widget.unmount();

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &output).context("Failed to write snapshot")?;
    writeln!(stdout)?;
    Ok(())
}

fn elapsed_ms(start: Instant) -> Millis {
    Millis::try_from(start.elapsed().as_millis()).unwrap_or(Millis::MAX)
}

fn run_live(config: &EngineConfig, hour: Option<u32>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build runtime")?;

    runtime.block_on(async {
        let start = Instant::now();
        let mut widget = build_widget(config, hour);
        let mut surface = JsonLinesSurface::new(io::stdout());
        widget.mount(0, &mut surface);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut frames = tokio::time::interval(Duration::from_millis(FRAME_MS));
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("Failed to read stdin")? else {
                        info!("stdin closed");
                        break;
                    };
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let now = elapsed_ms(start);
                    match serde_json::from_str::<HostEvent>(line) {
                        Ok(event) => {
                            widget.handle(now, &event);
                            widget.advance(now, &mut surface);
                        }
                        Err(err) => warn!(error = %err, line = %line, "Ignoring malformed event"),
                    }
                }
                _ = frames.tick() => {
                    widget.advance(elapsed_ms(start), &mut surface);
                }
            }
        }

        debug!(snapshot = ?widget.snapshot(), "Final state");
        widget.unmount();
        Ok::<(), anyhow::Error>(())
    })
}

fn print_shortcuts() -> Result<()> {
    let mut stdout = io::stdout().lock();
    for shortcut in shortcut_list() {
        writeln!(stdout, "{:<24} {}", shortcut.keys.join(" + "), shortcut.description)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let config = EngineConfig::load(cli.config.as_deref())
        .inspect_err(|err| error!(error = ?err, "Failed to load config"))?;

    match cli.command {
        Commands::Replay {
            events,
            hour,
            settle_ms,
            writes,
        } => run_replay(&config, events, hour, settle_ms, writes),
        Commands::Live { hour } => run_live(&config, hour),
        Commands::Shortcuts => print_shortcuts(),
    }
}
