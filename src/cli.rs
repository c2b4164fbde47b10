//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{BacktestConfig, BacktestJob, DEFAULT_INITIAL_CAPITAL, run_many};
use crate::domain::config_validation::{
    parse_optional_date, validate_backtest_config, validate_strategy_config,
};
use crate::domain::error::GoldenCrossError;
use crate::domain::frame::PriceFrame;
use crate::domain::indicator::support_resistance::{self, calculate_support_resistance};
use crate::domain::indicator::trend::analyze_trend;
use crate::domain::indicator::volatility::{self, latest_volatility};
use crate::domain::indicator::{IndicatorType, bollinger, macd};
use crate::domain::metrics::{DEFAULT_RISK_FREE_RATE, PerformanceReport};
use crate::domain::ohlcv::PriceChange;
use crate::domain::signal::{death_cross_dates, golden_cross_dates};
use crate::domain::strategy::{
    DEFAULT_LONG_WINDOW, DEFAULT_RSI_PERIOD, DEFAULT_SHORT_WINDOW, DEFAULT_VOLUME_WINDOW,
    StrategyConfig, StrategyKind,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(name = "goldencross", about = "Moving-average crossover backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        /// Strategy kind, overriding [strategy] kind
        #[arg(long)]
        strategy: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Output path stem for the trade and equity CSV files
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run both strategy variants on the same data and compare
    Compare {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Print an indicator and trend snapshot for a symbol
    Analyze {
        #[arg(long)]
        symbol: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols with data files
    ListSymbols {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Show data range for symbol(s)
    Info {
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            strategy,
            data_dir,
            output,
        } => run_backtest(
            &config,
            symbol.as_deref(),
            strategy.as_deref(),
            data_dir.as_ref(),
            output.as_ref(),
        ),
        Command::Compare {
            config,
            symbol,
            data_dir,
        } => run_compare(&config, symbol.as_deref(), data_dir.as_ref()),
        Command::Analyze {
            symbol,
            config,
            data_dir,
        } => run_analyze(&symbol, config.as_ref(), data_dir.as_ref()),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config, data_dir } => {
            run_list_symbols(config.as_ref(), data_dir.as_ref())
        }
        Command::Info {
            symbol,
            config,
            data_dir,
        } => run_info(symbol.as_deref(), config.as_ref(), data_dir.as_ref()),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| report_error(&e))
}

fn report_error(err: &GoldenCrossError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

/// Load and validate both config sections.
fn load_validated_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    info!(path = %path.display(), "loading config");
    let adapter = load_config(path)?;
    for key in adapter.unknown_keys() {
        warn!(config = adapter.source(), %key, "unrecognised config key");
    }
    validate_backtest_config(&adapter).map_err(|e| report_error(&e))?;
    validate_strategy_config(&adapter).map_err(|e| report_error(&e))?;
    Ok(adapter)
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, GoldenCrossError> {
    Ok(BacktestConfig {
        initial_capital: adapter.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL),
        risk_free_rate: adapter.get_double("backtest", "risk_free_rate", DEFAULT_RISK_FREE_RATE),
        strategy: build_strategy_config(adapter)?,
    })
}

pub fn build_strategy_config(adapter: &dyn ConfigPort) -> Result<StrategyConfig, GoldenCrossError> {
    let kind = match adapter.get_string("strategy", "kind") {
        Some(s) => s.parse::<StrategyKind>()?,
        None => StrategyKind::Crossover,
    };

    let window = |key: &str, default: usize| -> Result<usize, GoldenCrossError> {
        let value = adapter.get_int("strategy", key, default as i64);
        usize::try_from(value)
            .ok()
            .filter(|&w| w >= 1)
            .ok_or_else(|| {
                GoldenCrossError::invalid("strategy", key, format!("{key} must be at least 1"))
            })
    };
    let fraction = |key: &str| -> Option<f64> {
        adapter
            .get_string("strategy", key)
            .map(|_| adapter.get_double("strategy", key, f64::NAN))
            .filter(|v| v.is_finite())
    };

    let config = StrategyConfig {
        kind,
        short_window: window("short_window", DEFAULT_SHORT_WINDOW)?,
        long_window: window("long_window", DEFAULT_LONG_WINDOW)?,
        rsi_period: window("rsi_period", DEFAULT_RSI_PERIOD)?,
        volume_window: window("volume_window", DEFAULT_VOLUME_WINDOW)?,
        stop_loss_fraction: fraction("stop_loss"),
        volume_multiplier: fraction("volume_multiplier"),
    };
    Ok(config.with_kind(kind))
}

/// `--symbol` wins over `[backtest] symbols`, which wins over `[backtest] symbol`.
pub fn resolve_symbols(symbol_override: Option<&str>, config: &dyn ConfigPort) -> Vec<String> {
    match symbol_override {
        Some(s) => vec![s.trim().to_uppercase()],
        None => config.symbols(),
    }
}

/// `--data-dir` wins over `[data] csv_dir`; falls back to `./data`.
pub fn resolve_data_dir(data_dir: Option<&PathBuf>, config: Option<&dyn ConfigPort>) -> PathBuf {
    data_dir
        .cloned()
        .or_else(|| config.and_then(|c| c.csv_dir()))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

fn date_range(
    adapter: &dyn ConfigPort,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>), GoldenCrossError> {
    Ok((
        parse_optional_date(adapter, "start_date")?,
        parse_optional_date(adapter, "end_date")?,
    ))
}

/// Fetch a frame per symbol, skipping symbols that fail or have no bars.
pub fn load_frames(
    data_port: &dyn DataPort,
    symbols: &[String],
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Vec<PriceFrame> {
    let mut frames = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        match data_port.fetch_bars(symbol, start_date, end_date) {
            Ok(bars) if bars.is_empty() => {
                warn!(%symbol, "no bars in range, skipping");
                eprintln!("warning: skipping {symbol} (no data)");
            }
            Ok(bars) => {
                info!(%symbol, bars = bars.len(), "loaded bars");
                frames.push(PriceFrame::new(symbol.clone(), bars));
            }
            Err(e) => {
                warn!(%symbol, error = %e, "fetch failed, skipping");
                eprintln!("warning: skipping {symbol} ({e})");
            }
        }
    }
    frames
}

fn run_backtest(
    config_path: &PathBuf,
    symbol_override: Option<&str>,
    strategy_override: Option<&str>,
    data_dir: Option<&PathBuf>,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    let adapter = match load_validated_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let mut bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => return report_error(&e),
    };
    if let Some(kind) = strategy_override {
        match kind.parse::<StrategyKind>() {
            Ok(kind) => bt_config.strategy = bt_config.strategy.with_kind(kind),
            Err(e) => return report_error(&e),
        }
    }

    let (start_date, end_date) = match date_range(&adapter) {
        Ok(r) => r,
        Err(e) => return report_error(&e),
    };

    let symbols = resolve_symbols(symbol_override, &adapter);
    if symbols.is_empty() {
        eprintln!("error: no symbols configured (use --symbol or set [backtest] symbol)");
        return ExitCode::from(2);
    }

    let data_port = CsvAdapter::new(resolve_data_dir(data_dir, Some(&adapter)));
    run_backtest_pipeline(
        &data_port,
        &CsvReportAdapter::new(),
        &bt_config,
        &symbols,
        start_date,
        end_date,
        output_path.map(PathBuf::as_path),
    )
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    bt_config: &BacktestConfig,
    symbols: &[String],
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    output_path: Option<&Path>,
) -> ExitCode {
    let frames = load_frames(data_port, symbols, start_date, end_date);
    if frames.is_empty() {
        eprintln!("error: no valid symbols with data to backtest");
        return ExitCode::from(5);
    }

    info!(
        symbols = frames.len(),
        strategy = %bt_config.strategy.kind,
        "running backtest"
    );
    let jobs: Vec<BacktestJob> = frames
        .into_iter()
        .map(|frame| BacktestJob {
            frame,
            config: bt_config.clone(),
        })
        .collect();

    let mut reports = Vec::with_capacity(jobs.len());
    for result in run_many(&jobs) {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => return report_error(&e),
        }
    }

    for report in &reports {
        print_report(report);
    }

    let Some(output) = output_path else {
        return ExitCode::SUCCESS;
    };
    let written = if reports.len() == 1 {
        report_port.write(&reports[0], output)
    } else {
        report_port.write_many(&reports, output)
    };
    match written {
        Ok(()) => {
            eprintln!("\nReport written to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => report_error(&e),
    }
}

pub fn print_report(report: &PerformanceReport) {
    eprintln!("\n=== {} ({}) ===", report.symbol, report.strategy);
    eprintln!("Initial Capital:  {:.2}", report.initial_capital);
    eprintln!("Final Value:      {:.2}", report.final_value);
    eprintln!("Total Return:     {:.2}%", report.total_return);
    eprintln!("Buy & Hold:       {:.2}%", report.buy_hold_return);
    eprintln!("Excess Return:    {:.2}%", report.excess_return);
    eprintln!("Volatility:       {:.2}%", report.volatility);
    eprintln!("Sharpe Ratio:     {:.2}", report.sharpe_ratio);
    eprintln!("Max Drawdown:     {:.2}%", report.max_drawdown);
    eprintln!("Total Trades:     {}", report.total_trades);
    eprintln!("Win Rate:         {:.1}%", report.win_rate);

    if !report.trades.is_empty() {
        eprintln!("\n  {:<12} {:<5} {:>10} {:>8}  reason", "date", "side", "price", "shares");
        for trade in &report.trades {
            eprintln!(
                "  {:<12} {:<5} {:>10.2} {:>8}  {}",
                trade.date.to_string(),
                trade.action.to_string(),
                trade.price,
                trade.shares,
                trade.reason.map(|r| r.to_string()).unwrap_or_default(),
            );
        }
    }
}

fn run_compare(
    config_path: &PathBuf,
    symbol_override: Option<&str>,
    data_dir: Option<&PathBuf>,
) -> ExitCode {
    let adapter = match load_validated_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => return report_error(&e),
    };
    let (start_date, end_date) = match date_range(&adapter) {
        Ok(r) => r,
        Err(e) => return report_error(&e),
    };
    let symbols = resolve_symbols(symbol_override, &adapter);
    if symbols.is_empty() {
        eprintln!("error: no symbols configured (use --symbol or set [backtest] symbol)");
        return ExitCode::from(2);
    }

    let data_port = CsvAdapter::new(resolve_data_dir(data_dir, Some(&adapter)));
    run_compare_pipeline(&data_port, &bt_config, &symbols, start_date, end_date)
}

/// Both strategy variants per symbol, sharing windows and capital.
pub fn compare_jobs(frames: Vec<PriceFrame>, bt_config: &BacktestConfig) -> Vec<BacktestJob> {
    let mut jobs = Vec::with_capacity(frames.len() * 2);
    for frame in frames {
        for kind in [StrategyKind::Crossover, StrategyKind::VolumeConfirmed] {
            jobs.push(BacktestJob {
                frame: frame.clone(),
                config: BacktestConfig {
                    strategy: bt_config.strategy.clone().with_kind(kind),
                    ..bt_config.clone()
                },
            });
        }
    }
    jobs
}

pub fn run_compare_pipeline(
    data_port: &dyn DataPort,
    bt_config: &BacktestConfig,
    symbols: &[String],
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> ExitCode {
    let frames = load_frames(data_port, symbols, start_date, end_date);
    if frames.is_empty() {
        eprintln!("error: no valid symbols with data to compare");
        return ExitCode::from(5);
    }

    let jobs = compare_jobs(frames, bt_config);
    info!(jobs = jobs.len(), "running comparison");

    println!(
        "{:<12} {:<18} {:>10} {:>10} {:>8} {:>10} {:>7} {:>8}",
        "symbol", "strategy", "return%", "b&h%", "sharpe", "maxdd%", "trades", "win%"
    );
    let mut exit = ExitCode::SUCCESS;
    for result in run_many(&jobs) {
        match result {
            Ok(r) => println!(
                "{:<12} {:<18} {:>10.2} {:>10.2} {:>8.2} {:>10.2} {:>7} {:>8.1}",
                r.symbol,
                r.strategy.to_string(),
                r.total_return,
                r.buy_hold_return,
                r.sharpe_ratio,
                r.max_drawdown,
                r.total_trades,
                r.win_rate
            ),
            Err(e) => exit = report_error(&e),
        }
    }
    exit
}

fn run_analyze(
    symbol: &str,
    config_path: Option<&PathBuf>,
    data_dir: Option<&PathBuf>,
) -> ExitCode {
    let adapter = match config_path.map(load_validated_config).transpose() {
        Ok(a) => a,
        Err(code) => return code,
    };
    let strategy = match adapter.as_ref().map(|a| build_strategy_config(a)).transpose() {
        Ok(s) => s.unwrap_or_default(),
        Err(e) => return report_error(&e),
    };
    let (start_date, end_date) = match adapter.as_ref().map(|a| date_range(a)).transpose() {
        Ok(r) => r.unwrap_or((None, None)),
        Err(e) => return report_error(&e),
    };

    let data_port = CsvAdapter::new(resolve_data_dir(
        data_dir,
        adapter.as_ref().map(|a| a as &dyn ConfigPort),
    ));
    run_analyze_pipeline(&data_port, &symbol.to_uppercase(), &strategy, start_date, end_date)
}

/// Indicators attached for `analyze`.
pub fn analysis_indicators(strategy: &StrategyConfig) -> Vec<IndicatorType> {
    vec![
        IndicatorType::Sma(strategy.short_window),
        IndicatorType::Sma(strategy.long_window),
        IndicatorType::VolumeSma(strategy.volume_window),
        IndicatorType::Rsi(strategy.rsi_period),
        IndicatorType::Macd {
            fast: macd::DEFAULT_FAST,
            slow: macd::DEFAULT_SLOW,
            signal: macd::DEFAULT_SIGNAL,
        },
        IndicatorType::Bollinger {
            period: bollinger::DEFAULT_PERIOD,
            stddev_mult_x100: bollinger::DEFAULT_STDDEV_MULT_X100,
        },
    ]
}

pub fn run_analyze_pipeline(
    data_port: &dyn DataPort,
    symbol: &str,
    strategy: &StrategyConfig,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> ExitCode {
    let bars = match data_port.fetch_bars(symbol, start_date, end_date) {
        Ok(bars) if bars.is_empty() => {
            return report_error(&GoldenCrossError::NoData {
                symbol: symbol.to_string(),
            });
        }
        Ok(bars) => bars,
        Err(e) => return report_error(&e),
    };

    let frame = match PriceFrame::new(symbol, bars)
        .with_indicators(&analysis_indicators(strategy))
    {
        Ok(f) => f,
        Err(e) => return report_error(&e),
    };
    let bars = frame.bars();
    let latest = |column: &str| -> String {
        frame
            .column(column)
            .and_then(|values| values.last().copied().flatten())
            .map(|v| format!("{v:.2}"))
            .unwrap_or_else(|| "n/a".to_string())
    };

    println!("{symbol}: {} bars", bars.len());
    if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
        println!("  range:        {} to {}", first.date, last.date);
    }
    if let Some(change) = PriceChange::from_bars(bars) {
        println!(
            "  price:        {:.2} ({:+.2}, {:+.2}%)",
            change.current_price, change.change, change.change_percent
        );
    }

    let short = format!("MA{}", strategy.short_window);
    let long = format!("MA{}", strategy.long_window);
    println!("  {:<14}{}", format!("{short}:"), latest(&short));
    println!("  {:<14}{}", format!("{long}:"), latest(&long));
    println!("  Volume_MA:    {}", latest("Volume_MA"));
    println!("  RSI:          {}", latest("RSI"));
    println!(
        "  MACD:         {} / signal {} / hist {}",
        latest("MACD"),
        latest("MACD_Signal"),
        latest("MACD_Histogram")
    );
    println!(
        "  Bollinger:    {} / {} / {}",
        latest("BB_Upper"),
        latest("BB_Middle"),
        latest("BB_Lower")
    );
    match latest_volatility(bars, volatility::DEFAULT_PERIOD) {
        Some(v) => println!("  Volatility:   {:.2}%", v * 100.0),
        None => println!("  Volatility:   n/a"),
    }

    if let Some(levels) = calculate_support_resistance(bars, support_resistance::DEFAULT_WINDOW) {
        println!(
            "  Support:      {:.2}  Resistance: {:.2}",
            levels.support, levels.resistance
        );
    }
    if let Some(trend) = analyze_trend(bars, strategy.short_window, strategy.long_window) {
        println!("  Trend:        {}, {}", trend.price_trend, trend.volume_trend);
    }

    let golden = golden_cross_dates(bars, strategy.short_window, strategy.long_window);
    let death = death_cross_dates(bars, strategy.short_window, strategy.long_window);
    println!("  Golden crosses: {}", join_dates(&golden));
    println!("  Death crosses:  {}", join_dates(&death));

    ExitCode::SUCCESS
}

fn join_dates(dates: &[NaiveDate]) -> String {
    if dates.is_empty() {
        return "none".to_string();
    }
    dates.iter().map(NaiveDate::to_string).collect::<Vec<_>>().join(", ")
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_validated_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => return report_error(&e),
    };
    let strategy = &bt_config.strategy;

    eprintln!("\nBacktest:");
    eprintln!("  initial_capital: {:.2}", bt_config.initial_capital);
    eprintln!("  risk_free_rate:  {}", bt_config.risk_free_rate);
    eprintln!("\nStrategy:");
    eprintln!("  kind:          {}", strategy.kind);
    eprintln!("  windows:       MA{} / MA{}", strategy.short_window, strategy.long_window);
    eprintln!("  volume_window: {}", strategy.volume_window);
    if let Some(stop) = strategy.stop_loss() {
        eprintln!("  stop_loss:     {:.1}%", stop * 100.0);
    }
    if let Some(mult) = strategy.volume_filter() {
        eprintln!("  volume filter: {mult}x average");
    }

    let symbols = adapter.symbols();
    if !symbols.is_empty() {
        eprintln!("\nSymbols: {}", symbols.join(", "));
    }
    for key in adapter.unknown_keys() {
        eprintln!("warning: {key} is not used");
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn optional_config(config_path: Option<&PathBuf>) -> Result<Option<FileConfigAdapter>, ExitCode> {
    config_path.map(load_config).transpose()
}

fn run_list_symbols(config_path: Option<&PathBuf>, data_dir: Option<&PathBuf>) -> ExitCode {
    let config = match optional_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let dir = resolve_data_dir(data_dir, config.as_ref().map(|c| c as &dyn ConfigPort));
    let adapter = CsvAdapter::new(dir.clone());

    let symbols = match adapter.list_symbols() {
        Ok(s) => s,
        Err(e) => return report_error(&e),
    };

    if symbols.is_empty() {
        eprintln!("No symbols found in {}", dir.display());
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}

fn run_info(
    symbol: Option<&str>,
    config_path: Option<&PathBuf>,
    data_dir: Option<&PathBuf>,
) -> ExitCode {
    let config = match optional_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let config_port = config.as_ref().map(|c| c as &dyn ConfigPort);
    let adapter = CsvAdapter::new(resolve_data_dir(data_dir, config_port));

    let symbols = match (symbol, config_port) {
        (Some(s), _) => vec![s.trim().to_uppercase()],
        (None, Some(c)) => c.symbols(),
        (None, None) => match adapter.list_symbols() {
            Ok(s) => s,
            Err(e) => return report_error(&e),
        },
    };

    print_data_ranges(&adapter, &symbols);
    ExitCode::SUCCESS
}

pub fn print_data_ranges(data_port: &dyn DataPort, symbols: &[String]) {
    for s in symbols {
        match data_port.get_data_range(s) {
            Ok(Some((min_date, max_date, count))) => {
                println!("{}: {} bars, {} to {}", s, count, min_date, max_date);
            }
            Ok(None) => {
                eprintln!("{}: no data found", s);
            }
            Err(e) => {
                eprintln!("error querying {}: {}", s, e);
            }
        }
    }
}
