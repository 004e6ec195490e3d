//! CLI definition and dispatch.

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::load_bars;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::paper_gateway::{PaperAccount, PaperGateway};
use crate::adapters::series_market_data::SeriesMarketData;
use crate::domain::arbiter::arbitrate;
use crate::domain::bar::Bar;
use crate::domain::engine::{BarCheckpoint, CycleReport, Engine};
use crate::domain::error::EngineError;
use crate::domain::indicator::BandLine;
use crate::domain::lifecycle::LifecycleAction;
use crate::domain::market::MarketView;
use crate::domain::params::{build_params, EngineParams};
use crate::domain::position::Exposure;
use crate::domain::signal::Signal;

#[derive(Parser, Debug)]
#[command(name = "bandtrader", about = "Bollinger band and trend-follow signal engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load and validate a configuration, then print the resolved parameters
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Run one engine cycle with the last CSV row as the forming bar
    Signal {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: PathBuf,
    },
    /// List every bar on which a signal would have been emitted
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Validate { config } => run_validate(&config),
        Command::Signal { config, data } => run_signal(&config, &data),
        Command::Scan { config, data } => run_scan(&config, &data),
    }
}

fn fail(err: &EngineError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

/// Parse, resolve and validate the configuration at `path`.
pub fn load_engine(path: &Path) -> Result<(Engine, PaperAccount), EngineError> {
    let adapter = FileConfigAdapter::from_file(path)?;
    let params = build_params(&adapter)?;
    let engine = Engine::new(params)?;
    let account = PaperAccount::from_config(&adapter)?;
    Ok((engine, account))
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let (engine, account) = match load_engine(config_path) {
        Ok(loaded) => loaded,
        Err(e) => return fail(&e),
    };
    print_params(engine.params(), &account);
    eprintln!("Configuration is valid.");
    ExitCode::SUCCESS
}

fn print_params(params: &EngineParams, account: &PaperAccount) {
    let r = &params.risk;
    println!("[risk]");
    println!("  risk_percent          {}", r.risk_percent);
    println!("  atr_stop_multiplier   {}", r.atr_stop_multiplier);
    println!("  take_profit_points    {} (unused)", r.take_profit_points);
    println!("  max_volume            {}", r.max_volume);
    println!("[indicators]");
    println!("  bands                 {}", params.band(BandLine::Middle));
    println!("  atr                   {}", params.atr());
    println!("  regime                {}", params.regime_ema());
    println!("  trend fast            {}", params.trend_fast());
    println!("  trend slow            {}", params.trend_slow());
    println!("[filters]");
    println!("  max_slope_points      {}", params.regime.max_slope_points);
    println!("  min_atr_multiplier    {}", params.regime.min_atr_multiplier);
    println!("  squeeze lookback      {}", params.squeeze.lookback_bars);
    println!("  squeeze width cap     {}", params.squeeze.max_width_atr_multiplier);
    println!("  min_body_atr_mult     {}", params.patterns.min_body_atr_multiplier);
    println!("  max_doji_body_ratio   {}", params.patterns.max_doji_body_ratio);
    let l = &params.lifecycle;
    println!("[lifecycle]");
    println!("  breakeven             {} / {} points", l.breakeven_trigger_points, l.breakeven_buffer_points);
    println!("  trailing              {} points", l.trailing_stop_points);
    let s = &params.strategies;
    println!("[strategies]");
    println!("  doji_bounce           {}", s.doji_bounce);
    println!("  mean_reversion        {}", s.mean_reversion);
    println!("  squeeze_breakout      {}", s.squeeze_breakout);
    println!("  trend_follow          {}", s.trend_follow);
    println!("  magics                {} / {}", s.bollinger_magic, s.trend_magic);
    println!("[account]");
    println!("  equity                {}", account.equity);
    println!("  point / digits        {} / {}", account.spec.point, account.spec.digits);
    println!("  spread_points         {}", account.spread_points);
}

/// One engine cycle against a fresh paper account, last bar forming.
pub fn evaluate_latest(
    engine: &Engine,
    account: &PaperAccount,
    bars: Vec<Bar>,
) -> Result<CycleReport, EngineError> {
    if bars.is_empty() {
        return Err(EngineError::DataUnavailable {
            what: "no bars in data file".to_string(),
        });
    }
    let market = SeriesMarketData::new(bars, account.spread());
    let mut gateway = PaperGateway::new(account.clone(), &engine.params().strategies);
    let mut checkpoint = BarCheckpoint::new();
    Ok(engine.on_tick(&mut checkpoint, &market, account, &mut gateway))
}

fn run_signal(config_path: &Path, data_path: &Path) -> ExitCode {
    let (engine, account) = match load_engine(config_path) {
        Ok(loaded) => loaded,
        Err(e) => return fail(&e),
    };
    eprintln!("Loading bars from {}", data_path.display());
    let bars = match load_bars(data_path) {
        Ok(b) => b,
        Err(e) => return fail(&e),
    };
    eprintln!("Loaded {} bars", bars.len());

    let report = match evaluate_latest(&engine, &account, bars) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    match (&report.signal, &report.opened) {
        (Some(_), Some((intent, ticket))) => {
            println!(
                "{} {} volume={} entry={} stop={} target={} ticket={}",
                intent.direction,
                intent.label(),
                intent.volume,
                intent.entry_price,
                intent.stop_loss,
                intent.take_profit,
                ticket
            );
        }
        (Some(signal), None) => println!("{signal} (not opened)"),
        (None, _) => println!("no signal"),
    }
    for action in &report.actions {
        print_action(action);
    }
    if let Some(first) = report.failures.first() {
        for failure in &report.failures {
            eprintln!("error: {failure}");
        }
        return ExitCode::from(first);
    }
    ExitCode::SUCCESS
}

fn print_action(action: &LifecycleAction) {
    match action {
        LifecycleAction::MoveStop {
            ticket,
            reason,
            from,
            to,
        } => println!("ticket {ticket}: {reason:?} stop {from} -> {to}"),
        LifecycleAction::CloseOnReversal { ticket } => println!("ticket {ticket}: closed on reversal"),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanHit {
    pub index: usize,
    pub time: NaiveDateTime,
    pub signal: Signal,
}

/// Replay `bars` one forming bar at a time and collect every arbiter
/// decision. No orders are placed, so exposure is always empty.
pub fn scan_signals(engine: &Engine, account: &PaperAccount, bars: Vec<Bar>) -> Vec<ScanHit> {
    let mut market = SeriesMarketData::new(bars, account.spread());
    let mut hits = Vec::new();
    let params = engine.params();

    for index in 2..market.len() {
        market.set_cursor(index);
        let view = MarketView::new(&market);
        let Some(forming) = view.bar(0) else {
            continue;
        };
        if let Some(signal) = arbitrate(&view, params, &Exposure::default(), account.spec.point) {
            hits.push(ScanHit {
                index,
                time: forming.time,
                signal,
            });
        }
    }
    hits
}

fn run_scan(config_path: &Path, data_path: &Path) -> ExitCode {
    let (engine, account) = match load_engine(config_path) {
        Ok(loaded) => loaded,
        Err(e) => return fail(&e),
    };
    let bars = match load_bars(data_path) {
        Ok(b) => b,
        Err(e) => return fail(&e),
    };
    eprintln!("Scanning {} bars from {}", bars.len(), data_path.display());

    let hits = scan_signals(&engine, &account, bars);
    for hit in &hits {
        println!("{}  {}", hit.time.format("%Y-%m-%d %H:%M"), hit.signal);
    }
    eprintln!("{} signals", hits.len());
    ExitCode::SUCCESS
}
