//! CLI definition and dispatch.
//!
//! Diagnostics go to stderr; tick lines go to stdout.

use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::csv_adapter::{CsvPriceSource, write_bars};
use crate::adapters::csv_snapshot_adapter::CsvSnapshotAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config::SimulationConfig;
use crate::domain::error::TradesimError;
use crate::domain::generator::generate_default;
use crate::domain::indicator::IndicatorFrame;
use crate::domain::ledger::SignalOutcome;
use crate::domain::metrics::TradeStats;
use crate::domain::simulator::{self, Simulator, TickReport};
use crate::domain::snapshot::Snapshot;
use crate::ports::price_source::PriceSource;
use crate::ports::snapshot_port::SnapshotPort;

#[derive(Parser, Debug)]
#[command(name = "tradesim", about = "Single-instrument trading strategy simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Tick the simulator and print one line per bar
    Run {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long, default_value_t = 100)]
        ticks: usize,
        /// Wall-clock delay between ticks; 0 runs as fast as possible
        #[arg(long, default_value_t = 0)]
        interval_ms: u64,
        /// Write the final snapshot as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Validate a simulation configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Write a synthetic price series in the CSV source format
    Generate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Options of the `run` command.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub ticks: usize,
    pub interval: Duration,
    pub output: Option<PathBuf>,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub ticks: usize,
    pub live: bool,
    pub stats: TradeStats,
    pub snapshot: Snapshot,
    /// Balance plus open positions marked at the last close.
    pub equity: f64,
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Run {
            config,
            ticks,
            interval_ms,
            output,
            seed,
        } => {
            let options = RunOptions {
                ticks,
                interval: Duration::from_millis(interval_ms),
                output,
                seed,
            };
            run_simulation(&config, &options).map(|summary| print_summary(&summary))
        }
        Command::Validate { config } => run_validate(&config).map(|_| ()),
        Command::Generate {
            config,
            output,
            seed,
        } => run_generate(&config, &output, seed).map(|_| ()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<SimulationConfig, TradesimError> {
    eprintln!("Loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path)?;
    SimulationConfig::from_config(&adapter)
}

/// Build a simulator, wiring the CSV source when `csv_dir` is configured.
pub fn build_simulator(config: SimulationConfig) -> Result<Simulator, TradesimError> {
    let source: Option<Box<dyn PriceSource + Send>> = config
        .source
        .csv_dir
        .clone()
        .map(|dir| Box::new(CsvPriceSource::new(dir)) as Box<dyn PriceSource + Send>);
    Simulator::new(config, source)
}

pub fn run_simulation(config_path: &Path, options: &RunOptions) -> Result<RunSummary, TradesimError> {
    let mut config = load_config(config_path)?;
    if options.seed.is_some() {
        config.seed = options.seed;
    }

    let mut sim = build_simulator(config)?;
    for (attempt, failure) in sim.refresh().iter().enumerate() {
        eprintln!("warning: acquisition attempt {} failed: {}", attempt + 1, failure);
    }
    let live = sim.is_live();
    eprintln!(
        "Using {} series: {} bars of {} {}",
        if live { "live" } else { "synthetic" },
        sim.bars().len(),
        sim.config().symbol,
        sim.config().interval,
    );

    let (ticks, sim) = if options.interval.is_zero() {
        for _ in 0..options.ticks {
            println!("{}", format_tick(&sim.tick()));
        }
        (options.ticks, sim)
    } else {
        let shared = simulator::shared(sim);
        let ticker = simulator::spawn_ticker(
            shared.clone(),
            options.interval,
            Some(options.ticks),
            |report| println!("{}", format_tick(report)),
        );
        let ticks = ticker
            .join()
            .map_err(|_| TradesimError::Io(std::io::Error::other("ticker thread panicked")))?;
        let sim = Arc::try_unwrap(shared)
            .map_err(|_| TradesimError::Io(std::io::Error::other("simulator still shared")))?
            .into_inner()
            .map_err(|_| TradesimError::Io(std::io::Error::other("simulator lock poisoned")))?;
        (ticks, sim)
    };

    let snapshot = sim.snapshot();
    if let Some(output) = &options.output {
        let path = output.display().to_string();
        CsvSnapshotAdapter.write(&snapshot, &path)?;
        eprintln!("Snapshot written to: {}", path);
    }

    let equity = snapshot
        .last_close()
        .map_or(sim.ledger().balance, |close| sim.ledger().equity(close));
    Ok(RunSummary {
        ticks,
        live,
        stats: sim.trade_stats(),
        snapshot,
        equity,
    })
}

pub fn run_validate(config_path: &Path) -> Result<SimulationConfig, TradesimError> {
    let config = load_config(config_path)?;
    eprintln!("Config validated successfully");
    eprintln!("  symbol:   {}", config.symbol);
    eprintln!("  interval: {}", config.interval);
    eprintln!("  window:   {}", config.window);
    eprintln!("  balance:  {:.2}", config.initial_balance);
    let indicators: Vec<String> = IndicatorFrame::indicator_types()
        .iter()
        .map(ToString::to_string)
        .collect();
    eprintln!("  indicators: {}", indicators.join(", "));
    match &config.source.csv_dir {
        Some(dir) => eprintln!("  source:   csv ({})", dir.display()),
        None => eprintln!("  source:   synthetic"),
    }
    Ok(config)
}

/// Returns the number of bars written.
pub fn run_generate(
    config_path: &Path,
    output: &Path,
    seed: Option<u64>,
) -> Result<usize, TradesimError> {
    let config = load_config(config_path)?;
    let mut rng = match seed.or(config.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let bars = generate_default(&mut rng, config.interval, Utc::now().naive_utc());
    write_bars(output, &bars)?;
    eprintln!("Wrote {} bars to {}", bars.len(), output.display());
    Ok(bars.len())
}

pub fn describe_outcome(outcome: &SignalOutcome) -> String {
    match outcome {
        SignalOutcome::Opened {
            quantity,
            entry_price,
        } => format!("opened {:.6} @ {:.2}", quantity, entry_price),
        SignalOutcome::Closed { count, pnl } => format!("closed {} pnl {:+.2}", count, pnl),
        SignalOutcome::AlreadyOpen => "position already open".to_string(),
        SignalOutcome::Rejected { reason } => format!("rejected: {}", reason),
        SignalOutcome::NoAction => "-".to_string(),
    }
}

pub fn format_tick(report: &TickReport) -> String {
    let snap = &report.snapshot;
    let mut line = format!(
        "{} #{:<4} close={:.2} signal={:<4} [macd={} rsi={} bb={}] balance={:.2} equity={:.2} open={} {}",
        snap.timestamps.last().map(String::as_str).unwrap_or("-"),
        snap.cursor,
        snap.last_close().unwrap_or(f64::NAN),
        report.signal,
        report.sub_signals.macd,
        report.sub_signals.rsi,
        report.sub_signals.bollinger,
        snap.balance,
        report.equity,
        snap.positions.len(),
        describe_outcome(&report.outcome),
    );
    if report.settled > 0 {
        line.push_str(&format!(" settled={}", report.settled));
    }
    line
}

pub fn print_summary(summary: &RunSummary) {
    let stats = &summary.stats;
    eprintln!("\n=== Simulation Summary ===");
    eprintln!("Ticks:            {}", summary.ticks);
    eprintln!(
        "Series:           {}",
        if summary.live { "live" } else { "synthetic" }
    );
    eprintln!("Balance:          {:.2}", summary.snapshot.balance);
    eprintln!("Equity:           {:.2}", summary.equity);
    eprintln!("Open Positions:   {}", summary.snapshot.positions.len());
    eprintln!("Total Trades:     {}", stats.total_trades);
    eprintln!("Win Rate:         {:.1}%", stats.win_rate * 100.0);
    eprintln!("Realized PnL:     {:+.2}", stats.realized_pnl);
    eprintln!("Profit Factor:    {:.2}", stats.profit_factor);
    eprintln!("Largest Win:      {:.2}", stats.largest_win);
    eprintln!("Largest Loss:     {:.2}", stats.largest_loss);
}
