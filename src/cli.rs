//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvBarSource;
use crate::adapters::csv_report_adapter::CsvReportWriter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::bar_table::{BarTable, SymbolSeries};
use crate::domain::config::{load_backtest_config, BacktestConfig};
use crate::domain::engine;
use crate::domain::error::QuantsimError;
use crate::domain::strategy::{build_strategy, Strategy};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "quantsim", about = "Daily-bar strategy backtester")]
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
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Comma-separated symbol list, overriding the config
        #[arg(long)]
        symbols: Option<String>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration without loading any data
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
            output,
            symbols,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_backtest(&config, output.as_ref(), symbols.as_deref())
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config } => run_list_symbols(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = QuantsimError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Resolve, validate, and build everything a run needs from one config
/// file: the backtest parameters, the strategy, and the data directory.
fn prepare_run(
    adapter: &FileConfigAdapter,
) -> Result<(BacktestConfig, Box<dyn Strategy>, PathBuf), QuantsimError> {
    let bt_config = load_backtest_config(adapter)?;

    let name = adapter
        .get_string("strategy", "name")
        .ok_or_else(|| QuantsimError::ConfigMissing {
            section: "strategy".into(),
            key: "name".into(),
        })?;
    let strategy = build_strategy(&name, &bt_config.params)?;

    let csv_dir = adapter
        .get_string("data", "csv_dir")
        .ok_or_else(|| QuantsimError::ConfigMissing {
            section: "data".into(),
            key: "csv_dir".into(),
        })?;

    Ok((bt_config, strategy, PathBuf::from(csv_dir)))
}

pub fn resolve_symbols(symbol_override: Option<&str>, config: &dyn ConfigPort) -> Vec<String> {
    let raw = match symbol_override {
        Some(s) => s.to_string(),
        None => match config.get_string("data", "symbols") {
            Some(s) => s,
            None => return vec![],
        },
    };
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn run_backtest(
    config_path: &PathBuf,
    output_path: Option<&PathBuf>,
    symbol_override: Option<&str>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let (bt_config, mut strategy, csv_dir) = match prepare_run(&adapter) {
        Ok(parts) => parts,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("Loading strategy: {}", strategy.name());

    let symbols = resolve_symbols(symbol_override, &adapter);
    if symbols.is_empty() {
        eprintln!("error: no symbols configured");
        return ExitCode::from(2);
    }

    let source = CsvBarSource::new(csv_dir);
    let mut table = BarTable::new();
    for symbol in &symbols {
        match source.fetch_bars(symbol, bt_config.start_date, bt_config.end_date) {
            Ok(bars) if bars.is_empty() => {
                eprintln!("warning: skipping {} (no bars in range)", symbol);
            }
            Ok(bars) => table.insert_series(SymbolSeries::new(symbol.clone(), bars)),
            Err(e) => {
                eprintln!("warning: skipping {} ({})", symbol, e);
            }
        }
    }

    if table.is_empty() {
        let err = QuantsimError::NoData {
            symbol: symbols.join(", "),
        };
        eprintln!("error: {err}");
        return (&err).into();
    }

    let timeline = table.trading_dates(bt_config.start_date, bt_config.end_date);
    eprintln!(
        "Running backtest: {} symbols, {} to {}",
        table.symbol_count(),
        bt_config.start_date,
        bt_config.end_date,
    );
    eprintln!("  Processing: {} dates", timeline.len());

    let result = match engine::run_backtest(&table, strategy.as_mut(), &bt_config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let summary = &result.summary;
    eprintln!("\n=== Results ===");
    eprintln!("Total Return:     {:.2}%", summary.total_return * 100.0);
    eprintln!("Annualized:       {:.2}%", summary.annualized_return * 100.0);
    eprintln!("Volatility:       {:.2}%", summary.volatility * 100.0);
    eprintln!("Sharpe Ratio:     {:.2}", summary.sharpe_ratio);
    eprintln!("Max Drawdown:     {:.1}%", summary.max_drawdown * 100.0);
    eprintln!("Total Trades:     {}", summary.trade_count);
    eprintln!("Win Rate:         {:.1}%", summary.win_rate * 100.0);
    eprintln!("Final Value:      {:.2}", summary.final_value);
    if !result.rejections.is_empty() {
        eprintln!("Rejected Trades:  {}", result.rejections.len());
    }

    // Precedence: --output flag, then [report] output_dir, then ./report.
    let output = output_path.cloned().unwrap_or_else(|| {
        adapter
            .get_string("report", "output_dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("report"))
    });
    match CsvReportWriter::new().write(&result, &output) {
        Ok(()) => {
            eprintln!("\nReport written to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn run_dry_run(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let (bt_config, strategy, csv_dir) = match prepare_run(&adapter) {
        Ok(parts) => parts,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("Config validated successfully");
    eprintln!("\nBacktest:");
    eprintln!("  range:              {} to {}", bt_config.start_date, bt_config.end_date);
    eprintln!("  initial_cash:       {:.2}", bt_config.initial_cash);
    eprintln!("  max_position_pct:   {}", bt_config.max_position_pct);
    eprintln!("  max_open_positions: {}", bt_config.max_open_positions);
    eprintln!("\nStrategy: {}", strategy.name());
    for (key, value) in &bt_config.params {
        eprintln!("  {} = {}", key, value);
    }
    eprintln!("\nData: {}", csv_dir.display());

    let symbols = resolve_symbols(None, &adapter);
    if symbols.is_empty() {
        eprintln!("error: no symbols configured");
        return ExitCode::from(2);
    }
    eprintln!("Symbols: {}", symbols.join(", "));

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = prepare_run(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    eprintln!("Configuration is valid.");
    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let csv_dir = match adapter.get_string("data", "csv_dir") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let err = QuantsimError::ConfigMissing {
                section: "data".into(),
                key: "csv_dir".into(),
            };
            eprintln!("error: {err}");
            return (&err).into();
        }
    };

    let source = CsvBarSource::new(csv_dir);
    let symbols = match source.list_symbols() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if symbols.is_empty() {
        eprintln!("No symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}
