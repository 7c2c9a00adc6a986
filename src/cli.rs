//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;

use crate::adapters::cached_adapter::{CachedDataPort, DEFAULT_CACHE_TTL};
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::yahoo_adapter::YahooAdapter;
use crate::domain::config_validation::validate_scan_config;
use crate::domain::error::SwingError;
use crate::domain::period::{Interval, Period};
use crate::domain::position::{position_size, PositionSizing};
use crate::domain::scanner::{self, Analysis, ScanOptions, ScanReport};
use crate::domain::signal::{SignalCandidate, SignalParams};
use crate::domain::structure::STRUCTURE_LOOKBACK;
use crate::domain::watchlist::{display_symbol, qualify_symbol, Watchlist, DEFAULT_SUFFIX};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_CAPITAL: f64 = 10_000.0;
pub const DEFAULT_RISK_PCT: f64 = 1.0;

#[derive(Parser, Debug)]
#[command(name = "swingscan", about = "Swing-trade setup scanner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan the watchlist for trade setups
    Scan {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// History to fetch: 1mo, 3mo, 6mo, 1y, 2y
        #[arg(long)]
        period: Option<String>,
        /// Bar size: 1d, 5d, 1wk
        #[arg(long)]
        interval: Option<String>,
        #[arg(short, long)]
        watchlist: Option<PathBuf>,
        /// Write the ranked signals to a CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Stop after this many symbols
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show structure, indicators and signals for one symbol
    Analyze {
        ticker: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        period: Option<String>,
        #[arg(long)]
        interval: Option<String>,
    },
    /// Position size for a fixed-fractional risk budget
    Size {
        #[arg(long)]
        entry: f64,
        #[arg(long)]
        stop: f64,
        #[arg(long)]
        capital: Option<f64>,
        #[arg(long)]
        risk_pct: Option<f64>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the effective watchlist
    Watchlist {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Scan {
            config,
            period,
            interval,
            watchlist,
            output,
            limit,
        } => run_scan(
            config.as_ref(),
            period.as_deref(),
            interval.as_deref(),
            watchlist.as_ref(),
            output.as_deref(),
            limit,
        ),
        Command::Analyze {
            ticker,
            config,
            period,
            interval,
        } => run_analyze(&ticker, config.as_ref(), period.as_deref(), interval.as_deref()),
        Command::Size {
            entry,
            stop,
            capital,
            risk_pct,
            config,
        } => run_size(entry, stop, capital, risk_pct, config.as_ref()),
        Command::Watchlist { config } => run_watchlist(config.as_ref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

/// Loads and validates the INI file; no file means all defaults.
pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, SwingError> {
    let adapter = match path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            FileConfigAdapter::from_file(path)?
        }
        None => FileConfigAdapter::empty(),
    };
    validate_scan_config(&adapter)?;
    Ok(adapter)
}

/// Scan options from config, with CLI overrides for period and interval.
pub fn build_scan_options(
    config: &dyn ConfigPort,
    period: Option<&str>,
    interval: Option<&str>,
) -> Result<ScanOptions, SwingError> {
    let period = match period.map(str::to_string).or_else(|| config.get_string("scan", "period")) {
        Some(s) => s.parse::<Period>()?,
        None => Period::default(),
    };
    let interval = match interval
        .map(str::to_string)
        .or_else(|| config.get_string("scan", "interval"))
    {
        Some(s) => s.parse::<Interval>()?,
        None => Interval::default(),
    };

    let defaults = SignalParams::default();
    let params = SignalParams {
        volume_spike_multiplier: config.get_double(
            "signals",
            "volume_spike_multiplier",
            defaults.volume_spike_multiplier,
        ),
        ema_proximity_pct: config.get_double(
            "signals",
            "ema_proximity_pct",
            defaults.ema_proximity_pct,
        ),
        swing_high_lookback: positive_usize(
            config.get_int("signals", "swing_high_lookback", defaults.swing_high_lookback as i64),
            defaults.swing_high_lookback,
        ),
    };

    Ok(ScanOptions {
        period,
        interval,
        params,
        symbol_suffix: config
            .get_string("scan", "symbol_suffix")
            .unwrap_or_else(|| DEFAULT_SUFFIX.to_string()),
        structure_lookback: positive_usize(
            config.get_int("signals", "structure_lookback", STRUCTURE_LOOKBACK as i64),
            STRUCTURE_LOOKBACK,
        ),
    })
}

fn positive_usize(value: i64, default: usize) -> usize {
    usize::try_from(value).ok().filter(|v| *v > 0).unwrap_or(default)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Yahoo,
    Csv,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub source: DataSource,
    pub csv_dir: Option<PathBuf>,
    pub max_retries: u32,
    pub timeout_secs: u64,
    pub cache_ttl: Duration,
}

pub fn build_data_settings(config: &dyn ConfigPort) -> Result<DataSettings, SwingError> {
    let source = match config
        .get_string("data", "source")
        .map(|s| s.trim().to_lowercase())
        .as_deref()
    {
        None | Some("yahoo") => DataSource::Yahoo,
        Some("csv") => DataSource::Csv,
        Some(other) => {
            return Err(SwingError::invalid(
                "data",
                "source",
                format!("unknown data source '{other}'"),
            ))
        }
    };

    let csv_dir = config.get_string("data", "csv_dir").map(PathBuf::from);
    if source == DataSource::Csv && csv_dir.is_none() {
        return Err(SwingError::ConfigMissing {
            section: "data".to_string(),
            key: "csv_dir".to_string(),
        });
    }

    Ok(DataSettings {
        source,
        csv_dir,
        max_retries: u32::try_from(config.get_int("data", "max_retries", 3)).unwrap_or(3),
        timeout_secs: u64::try_from(config.get_int("data", "timeout_secs", 30)).unwrap_or(30),
        cache_ttl: u64::try_from(
            config.get_int("scan", "cache_ttl_secs", DEFAULT_CACHE_TTL.as_secs() as i64),
        )
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_CACHE_TTL),
    })
}

/// Builds the configured data source behind the fetch cache.
pub fn build_data_port(settings: &DataSettings) -> Result<Box<dyn DataPort>, SwingError> {
    match settings.source {
        DataSource::Yahoo => {
            let adapter = YahooAdapter::new(settings.timeout_secs, settings.max_retries)?;
            Ok(Box::new(CachedDataPort::new(adapter, settings.cache_ttl)))
        }
        DataSource::Csv => {
            let dir = settings.csv_dir.clone().ok_or_else(|| SwingError::ConfigMissing {
                section: "data".to_string(),
                key: "csv_dir".to_string(),
            })?;
            Ok(Box::new(CachedDataPort::new(
                CsvAdapter::new(dir),
                settings.cache_ttl,
            )))
        }
    }
}

/// Watchlist from the CLI flag, then `[scan] watchlist`, then the built-in list.
pub fn resolve_watchlist(
    config: &dyn ConfigPort,
    path_override: Option<&PathBuf>,
) -> Result<Watchlist, SwingError> {
    let path = path_override
        .cloned()
        .or_else(|| config.get_string("scan", "watchlist").map(PathBuf::from));
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading watchlist");
            Watchlist::load(&path)
        }
        None => Ok(Watchlist::builtin()?),
    }
}

fn run_scan(
    config_path: Option<&PathBuf>,
    period: Option<&str>,
    interval: Option<&str>,
    watchlist_path: Option<&PathBuf>,
    output: Option<&Path>,
    limit: Option<usize>,
) -> Result<(), SwingError> {
    let config = load_config(config_path)?;
    let options = build_scan_options(&config, period, interval)?;
    let settings = build_data_settings(&config)?;
    let watchlist = resolve_watchlist(&config, watchlist_path)?;
    let port = build_data_port(&settings)?;
    let report_skipped = config.get_bool("scan", "report_skipped", true);

    let report = run_scan_pipeline(port.as_ref(), &watchlist, &options, limit);

    print!("{}", format_signal_table(&report));
    print_scan_summary(&report, report_skipped);

    if let Some(output) = output {
        CsvReportAdapter::new().write_scan(&report, &output.to_string_lossy())?;
        eprintln!("Report written to: {}", output.display());
    }
    Ok(())
}

/// Runs the scan with per-symbol progress on stderr.
pub fn run_scan_pipeline(
    port: &dyn DataPort,
    watchlist: &Watchlist,
    options: &ScanOptions,
    limit: Option<usize>,
) -> ScanReport {
    eprintln!(
        "Scanning {} symbols ({} / {})...",
        watchlist.len(),
        options.period,
        options.interval
    );

    scanner::scan_with_progress(port, watchlist, options, |index, total, symbol| {
        if limit.is_some_and(|n| index >= n) {
            return ControlFlow::Break(());
        }
        eprintln!(
            "  [{}/{}] {}",
            index + 1,
            total,
            display_symbol(symbol, &options.symbol_suffix)
        );
        ControlFlow::Continue(())
    })
}

fn print_scan_summary(report: &ScanReport, report_skipped: bool) {
    if report_skipped && !report.skipped.is_empty() {
        eprintln!("\nSkipped {} symbols:", report.skipped.len());
        for skip in &report.skipped {
            eprintln!("  {}: {}", skip.symbol, skip.reason);
        }
    }
    if report.cancelled {
        eprintln!("\nScan stopped early after {} symbols", report.scanned + report.skipped.len());
    }
    eprintln!("\n{}", scan_summary_line(report));
}

pub fn scan_summary_line(report: &ScanReport) -> String {
    match report.count() {
        0 => "No trades found".to_string(),
        1 => "Found 1 trade".to_string(),
        n => format!("Found {n} trades"),
    }
}

/// Ranked signal table; empty when the report has no signals.
pub fn format_signal_table(report: &ScanReport) -> String {
    let mut out = String::new();
    if report.is_empty() {
        return out;
    }

    let _ = writeln!(
        out,
        "{:<14} {:<16} {:>10} {:>10} {:>10} {:>8}",
        "Stock", "Strategy", "Entry", "Stop Loss", "Target", "RR Ratio"
    );
    for signal in &report.signals {
        let c = &signal.candidate;
        let _ = writeln!(
            out,
            "{:<14} {:<16} {:>10.2} {:>10.2} {:>10.2} {:>8.2}",
            signal.symbol,
            c.strategy.to_string(),
            c.entry,
            c.stop_loss,
            c.target,
            c.reward_risk
        );
    }
    out
}

fn run_analyze(
    ticker: &str,
    config_path: Option<&PathBuf>,
    period: Option<&str>,
    interval: Option<&str>,
) -> Result<(), SwingError> {
    let config = load_config(config_path)?;
    let options = build_scan_options(&config, period, interval)?;
    let settings = build_data_settings(&config)?;
    let port = build_data_port(&settings)?;

    let symbol = qualify_symbol(ticker, &options.symbol_suffix);
    eprintln!("Analyzing {} ({} / {})...", symbol, options.period, options.interval);

    let analysis = scanner::analyze(port.as_ref(), &symbol, &options)?;
    print!("{}", format_analysis(&analysis, &options));
    Ok(())
}

fn fmt_level(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "n/a".to_string(),
    }
}

fn fmt_candidate(c: &SignalCandidate) -> String {
    format!(
        "{}: entry {:.2}, stop {:.2}, target {:.2}, R:R {:.2}",
        c.strategy, c.entry, c.stop_loss, c.target, c.reward_risk
    )
}

pub fn format_analysis(analysis: &Analysis, options: &ScanOptions) -> String {
    let mut out = String::new();
    let bar = analysis.latest_bar();
    let row = analysis.indicators.latest();
    let s = &analysis.structure;

    let _ = writeln!(
        out,
        "{}  {} bars, last {}",
        display_symbol(&analysis.symbol, &options.symbol_suffix),
        analysis.bars.len(),
        bar.date
    );
    let _ = writeln!(out, "Trend:       {}", s.trend);
    let bias = match s.above_long_term {
        Some(true) => "BULLISH (above EMA 200)",
        Some(false) => "BEARISH (below EMA 200)",
        None => "UNKNOWN (fewer than 200 bars)",
    };
    let _ = writeln!(out, "Long-term:   {}", bias);
    let _ = writeln!(
        out,
        "Last bar:    O {:.2}  H {:.2}  L {:.2}  C {:.2}  V {}",
        bar.open, bar.high, bar.low, bar.close, bar.volume
    );
    let _ = writeln!(
        out,
        "Resistance:  {:.2}  (high of last {} bars)",
        s.recent_high, s.lookback_bars
    );
    let _ = writeln!(
        out,
        "Support:     {:.2}  (low of last {} bars)",
        s.recent_low, s.lookback_bars
    );
    let _ = writeln!(
        out,
        "EMA 20/50/200: {:.2} / {:.2} / {:.2}",
        row.ema_20, row.ema_50, row.ema_200
    );
    let _ = writeln!(
        out,
        "Bollinger:   upper {}  middle {}  lower {}",
        fmt_level(row.upper_bb),
        fmt_level(row.ma_20),
        fmt_level(row.lower_bb)
    );
    let squeeze = match analysis.squeeze {
        Some(true) => "yes",
        Some(false) => "no",
        None => "n/a",
    };
    let _ = writeln!(out, "Squeeze:     {}", squeeze);

    if analysis.signals.is_empty() {
        let _ = writeln!(out, "Signals:     none");
    } else {
        let _ = writeln!(out, "Signals:");
        for c in &analysis.signals {
            let _ = writeln!(out, "  {}", fmt_candidate(c));
        }
    }
    out
}

fn run_size(
    entry: f64,
    stop: f64,
    capital: Option<f64>,
    risk_pct: Option<f64>,
    config_path: Option<&PathBuf>,
) -> Result<(), SwingError> {
    let config = load_config(config_path)?;
    let capital = capital.unwrap_or_else(|| config.get_double("risk", "capital", DEFAULT_CAPITAL));
    let risk_pct =
        risk_pct.unwrap_or_else(|| config.get_double("risk", "risk_pct", DEFAULT_RISK_PCT));

    let sizing = position_size(capital, risk_pct, entry, stop)?;
    print!("{}", format_sizing(&sizing));
    Ok(())
}

pub fn format_sizing(sizing: &PositionSizing) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Risk per share:  {:.2}", sizing.risk_per_share);
    let _ = writeln!(out, "Max risk:        {:.2}", sizing.max_risk_amount);
    let _ = writeln!(out, "Quantity:        {}", sizing.quantity);
    let _ = writeln!(out, "Total margin:    {:.2}", sizing.total_margin);
    out
}

fn run_watchlist(config_path: Option<&PathBuf>) -> Result<(), SwingError> {
    let config = load_config(config_path)?;
    let watchlist = resolve_watchlist(&config, None)?;
    for symbol in watchlist.symbols() {
        println!("{}", symbol);
    }
    eprintln!("{} symbols", watchlist.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn parses_scan_subcommand() {
        let cli = Cli::try_parse_from([
            "swingscan", "scan", "--period", "1y", "--interval", "1wk", "--limit", "5",
        ])
        .unwrap();
        match cli.command {
            Command::Scan {
                period,
                interval,
                limit,
                ..
            } => {
                assert_eq!(period.as_deref(), Some("1y"));
                assert_eq!(interval.as_deref(), Some("1wk"));
                assert_eq!(limit, Some(5));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_analyze_subcommand() {
        let cli = Cli::try_parse_from(["swingscan", "analyze", "sbin"]).unwrap();
        assert!(matches!(cli.command, Command::Analyze { ticker, .. } if ticker == "sbin"));
    }

    #[test]
    fn size_requires_entry_and_stop() {
        assert!(Cli::try_parse_from(["swingscan", "size", "--entry", "100"]).is_err());
        assert!(Cli::try_parse_from(["swingscan", "size", "--entry", "100", "--stop", "95"]).is_ok());
    }

    #[test]
    fn cli_flags_override_config() {
        let cfg = config("[scan]\nperiod = 1y\ninterval = 1wk\n");
        let options = build_scan_options(&cfg, Some("3mo"), None).unwrap();
        assert_eq!(options.period, Period::ThreeMonths);
        assert_eq!(options.interval, Interval::Weekly);
    }

    #[test]
    fn bad_cli_period_fails_fast() {
        let cfg = FileConfigAdapter::empty();
        let err = build_scan_options(&cfg, Some("10y"), None).unwrap_err();
        assert!(matches!(err, SwingError::ConfigInvalid { key, .. } if key == "period"));
    }

    #[test]
    fn data_settings_defaults() {
        let settings = build_data_settings(&FileConfigAdapter::empty()).unwrap();
        assert_eq!(settings.source, DataSource::Yahoo);
        assert_eq!(settings.max_retries, 3);
        assert_eq!(settings.timeout_secs, 30);
        assert_eq!(settings.cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn summary_line_counts_trades() {
        let mut report = ScanReport::default();
        assert_eq!(scan_summary_line(&report), "No trades found");

        report.signals.push(scanner::TaggedSignal {
            symbol: "SBIN".into(),
            candidate: SignalCandidate {
                strategy: crate::domain::signal::StrategyKind::BbBreakout,
                entry: 10.0,
                stop_loss: 9.0,
                target: 12.0,
                reward_risk: 2.0,
            },
        });
        assert_eq!(scan_summary_line(&report), "Found 1 trade");
        report.signals.push(report.signals[0].clone());
        assert_eq!(scan_summary_line(&report), "Found 2 trades");
    }

    #[test]
    fn sizing_output() {
        let sizing = position_size(10_000.0, 1.0, 100.0, 95.0).unwrap();
        let text = format_sizing(&sizing);
        assert!(text.contains("Quantity:        20"));
        assert!(text.contains("Total margin:    2000.00"));
    }
}
