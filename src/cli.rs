//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvKlineAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report::JsonReportAdapter;
use crate::domain::config_validation::validate_config;
use crate::domain::error::TidesimError;
use crate::domain::exit::{
    ExitPolicy, ExitRule, DEFAULT_MAX_HOLD_HOURS, DEFAULT_TAKE_PROFIT_PCT,
    DEFAULT_TRAILING_STOP_PCT,
};
use crate::domain::metrics::Summary;
use crate::domain::momentum::{MomentumParams, MomentumSignals};
use crate::domain::replay::{run_portfolio, ReplayConfig, TickOrdering};
use crate::domain::series::SeriesData;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "tidesim", about = "Deterministic trading strategy backtester")]
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
        /// Restrict the run to one symbol from the configured list
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in the configured data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            output,
        } => run_backtest(&config, symbol.as_deref(), output.as_ref()),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config } => run_list_symbols(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = TidesimError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn run_backtest(
    config_path: &PathBuf,
    symbol_override: Option<&str>,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 2: Resolve symbols; the configured order is the replay order
    let mut symbols = parse_symbols(&adapter);
    if let Some(symbol) = symbol_override {
        if !symbols.iter().any(|s| s == symbol) {
            eprintln!("error: symbol {} is not in the configured list", symbol);
            return ExitCode::from(2);
        }
        symbols = vec![symbol.to_string()];
    }

    // Stage 3: Build replay and strategy config
    let replay_config = build_replay_config(&adapter);
    let params = build_momentum_params(&adapter);

    // Stage 4: Fetch klines; an empty series is skipped with a warning,
    // a read failure aborts the run
    let data_path = adapter.get_string("data", "path").unwrap_or_default();
    let data_port = CsvKlineAdapter::new(PathBuf::from(data_path));

    let mut series: Vec<SeriesData> = Vec::with_capacity(symbols.len());
    for symbol in &symbols {
        let klines = match data_port.fetch_klines(symbol) {
            Ok(k) => k,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };
        if klines.is_empty() {
            eprintln!("warning: no data for {}, skipping", symbol);
            continue;
        }
        series.push(SeriesData::new(symbol.clone(), klines));
    }
    if series.is_empty() {
        let err = TidesimError::NoData {
            symbol: symbols.join(","),
        };
        eprintln!("error: {err}");
        return (&err).into();
    }

    // Stage 5: Compute signals and replay
    eprintln!(
        "Running backtest: {} symbols, {} bars",
        series.len(),
        series.iter().map(SeriesData::len).sum::<usize>()
    );
    let signals = MomentumSignals::from_series(&series, &params);
    let result = run_portfolio(&series, &signals, &replay_config);

    // Stage 6: Summarize
    let summary = Summary::compute(result.initial_balance, result.final_balance, &result.log);

    eprintln!("\n=== Results ===");
    eprintln!("Initial Balance:  {:.2}", summary.initial_balance);
    eprintln!("Final Balance:    {:.2}", summary.final_balance);
    eprintln!("Total Return:     {:.2}%", summary.total_return_pct);
    eprintln!("Total Trades:     {}", summary.total_trades);
    eprintln!("Win Rate:         {:.1}%", summary.win_rate_pct);
    eprintln!("Profit Factor:    {:.2}", summary.profit_factor);
    eprintln!("Max Drawdown:     {:.1}%", summary.max_drawdown_pct);
    eprintln!(
        "Avg Duration:     {:.1}h",
        summary.avg_trade_duration_hours
    );

    // Stage 7: Write report
    let output = output_path
        .cloned()
        .unwrap_or_else(|| PathBuf::from("report.json"));
    let output_str = output.display().to_string();
    match JsonReportAdapter.write(&result, &summary, &output_str) {
        Ok(()) => {
            eprintln!("\nReport written to: {}", output_str);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    match validate_config(&adapter) {
        Ok(()) => {
            eprintln!("Config validated successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_list_symbols(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let data_path = match adapter.get_string("data", "path") {
        Some(p) if !p.trim().is_empty() => p,
        _ => {
            let err = TidesimError::ConfigMissing {
                section: "data".into(),
                key: "path".into(),
            };
            eprintln!("error: {err}");
            return (&err).into();
        }
    };

    let data_port = CsvKlineAdapter::new(PathBuf::from(data_path));
    match data_port.list_symbols() {
        Ok(symbols) => {
            for symbol in symbols {
                println!("{}", symbol);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn parse_symbols(adapter: &dyn ConfigPort) -> Vec<String> {
    adapter
        .get_string("backtest", "symbols")
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn build_replay_config(adapter: &dyn ConfigPort) -> ReplayConfig {
    let ordering = match adapter.get_string("backtest", "ordering").as_deref() {
        Some("entries_first") => TickOrdering::EntriesBeforeExits,
        _ => TickOrdering::ExitsBeforeEntries,
    };

    let exit_policy = ExitPolicy {
        rules: vec![
            ExitRule::OppositeSignal,
            ExitRule::TakeProfit {
                pct: adapter.get_double("backtest", "take_profit_pct", DEFAULT_TAKE_PROFIT_PCT),
            },
            ExitRule::TrailingStop {
                pct: adapter.get_double("backtest", "trailing_stop_pct", DEFAULT_TRAILING_STOP_PCT),
            },
            ExitRule::TimeExit {
                max_hold_hours: adapter.get_double(
                    "backtest",
                    "max_hold_hours",
                    DEFAULT_MAX_HOLD_HOURS,
                ),
            },
        ],
    };

    ReplayConfig {
        initial_balance: adapter.get_double("backtest", "initial_balance", 1000.0),
        risk_per_trade: adapter.get_double("backtest", "risk_per_trade", 0.1),
        ordering,
        exit_policy,
    }
}

pub fn build_momentum_params(adapter: &dyn ConfigPort) -> MomentumParams {
    MomentumParams {
        rsi_period: adapter.get_int("strategy", "rsi_period", 14) as usize,
        oversold: adapter.get_double("strategy", "oversold", 30.0),
        overbought: adapter.get_double("strategy", "overbought", 70.0),
        macd_fast: adapter.get_int("strategy", "macd_fast", 12) as usize,
        macd_slow: adapter.get_int("strategy", "macd_slow", 26) as usize,
        macd_signal: adapter.get_int("strategy", "macd_signal", 9) as usize,
    }
}
