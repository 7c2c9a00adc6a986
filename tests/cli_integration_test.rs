//! CLI integration tests for the scan command orchestration.
//!
//! Tests cover:
//! - Config loading and validation with real INI files on disk
//! - Option and data-source resolution (build_scan_options, build_data_settings)
//! - Watchlist resolution order
//! - Full pipeline over CSV fixtures, including the CSV report

mod common;

use common::*;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use swingscan::adapters::csv_report_adapter::CsvReportAdapter;
use swingscan::adapters::file_config_adapter::FileConfigAdapter;
use swingscan::cli::{self, DataSource};
use swingscan::domain::error::SwingError;
use swingscan::domain::period::{Interval, Period};
use swingscan::ports::report_port::ReportPort;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const VALID_INI: &str = r#"
[scan]
period = 1y
interval = 1d
symbol_suffix = .NS
cache_ttl_secs = 60

[data]
source = yahoo
max_retries = 1
timeout_secs = 5

[signals]
volume_spike_multiplier = 1.5
ema_proximity_pct = 0.03
swing_high_lookback = 20
structure_lookback = 40

[risk]
capital = 50000
risk_pct = 2
"#;

mod config_loading {
    use super::*;

    #[test]
    fn load_valid_config_file() {
        let file = write_temp_ini(VALID_INI);
        let path = file.path().to_path_buf();
        let config = cli::load_config(Some(&path)).unwrap();

        let options = cli::build_scan_options(&config, None, None).unwrap();
        assert_eq!(options.period, Period::OneYear);
        assert_eq!(options.interval, Interval::Daily);
        assert_eq!(options.params.volume_spike_multiplier, 1.5);
        assert_eq!(options.params.ema_proximity_pct, 0.03);
        assert_eq!(options.params.swing_high_lookback, 20);
        assert_eq!(options.structure_lookback, 40);
        assert_eq!(options.symbol_suffix, ".NS");

        let settings = cli::build_data_settings(&config).unwrap();
        assert_eq!(settings.source, DataSource::Yahoo);
        assert_eq!(settings.max_retries, 1);
        assert_eq!(settings.timeout_secs, 5);
        assert_eq!(settings.cache_ttl, Duration::from_secs(60));
    }

    #[test]
    fn no_config_file_uses_defaults() {
        let config = cli::load_config(None).unwrap();
        let options = cli::build_scan_options(&config, None, None).unwrap();

        assert_eq!(options.period, Period::SixMonths);
        assert_eq!(options.interval, Interval::Daily);
        assert_eq!(options.params.volume_spike_multiplier, 1.2);
        assert_eq!(options.params.swing_high_lookback, 30);
        assert_eq!(options.structure_lookback, 50);
    }

    #[test]
    fn missing_config_file_is_parse_error() {
        let path = PathBuf::from("/nonexistent/swingscan.ini");
        let err = cli::load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, SwingError::ConfigParse { .. }));
        assert_eq!(err.exit_status(), 2);
    }

    #[test]
    fn invalid_period_fails_before_any_fetch() {
        let file = write_temp_ini("[scan]\nperiod = 5y\n");
        let path = file.path().to_path_buf();
        let err = cli::load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, SwingError::ConfigInvalid { key, .. } if key == "period"));
    }

    #[test]
    fn cli_interval_overrides_config() {
        let config = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let options = cli::build_scan_options(&config, Some("6mo"), Some("1wk")).unwrap();
        assert_eq!(options.period, Period::SixMonths);
        assert_eq!(options.interval, Interval::Weekly);
    }

    #[test]
    fn csv_source_requires_directory() {
        let config = FileConfigAdapter::from_string("[data]\nsource = csv\n").unwrap();
        let err = cli::build_data_settings(&config).unwrap_err();
        assert!(matches!(err, SwingError::ConfigMissing { key, .. } if key == "csv_dir"));
    }
}

mod watchlist_resolution {
    use super::*;

    #[test]
    fn builtin_list_when_nothing_configured() {
        let config = FileConfigAdapter::empty();
        let wl = cli::resolve_watchlist(&config, None).unwrap();
        assert!(wl.len() > 100);
    }

    #[test]
    fn config_path_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("list.txt");
        std::fs::write(&list, "sbin.ns\nitc.ns\n").unwrap();

        let config = FileConfigAdapter::from_string(&format!(
            "[scan]\nwatchlist = {}\n",
            list.display()
        ))
        .unwrap();
        let wl = cli::resolve_watchlist(&config, None).unwrap();
        assert_eq!(wl.symbols(), ["SBIN.NS", "ITC.NS"]);
    }

    #[test]
    fn flag_overrides_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let flag_list = dir.path().join("flag.txt");
        std::fs::write(&flag_list, "TCS.NS\n").unwrap();

        let config =
            FileConfigAdapter::from_string("[scan]\nwatchlist = /nonexistent/list.txt\n").unwrap();
        let wl = cli::resolve_watchlist(&config, Some(&flag_list)).unwrap();
        assert_eq!(wl.symbols(), ["TCS.NS"]);
    }

    #[test]
    fn duplicate_symbols_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("dup.txt");
        std::fs::write(&list, "TCS.NS\ntcs.ns\n").unwrap();

        let err = cli::resolve_watchlist(&FileConfigAdapter::empty(), Some(&list)).unwrap_err();
        assert!(matches!(err, SwingError::Watchlist(_)));
        assert_eq!(err.exit_status(), 3);
    }
}

mod pipeline {
    use super::*;

    fn csv_config(dir: &std::path::Path) -> FileConfigAdapter {
        FileConfigAdapter::from_string(&format!(
            "[scan]\nperiod = 1y\n\n[data]\nsource = csv\ncsv_dir = {}\n",
            dir.display()
        ))
        .unwrap()
    }

    #[test]
    fn scan_over_csv_files_ranks_and_skips() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "AAA.NS", &rising(250, 0.0, 2000));
        write_csv(dir.path(), "BBB.NS", &flat_then(110.0, 111.0, 1300));

        let config = csv_config(dir.path());
        let options = cli::build_scan_options(&config, None, None).unwrap();
        let settings = cli::build_data_settings(&config).unwrap();
        let port = cli::build_data_port(&settings).unwrap();
        let wl = watchlist(&["AAA.NS", "BBB.NS", "MISSING.NS"]);

        let report = cli::run_scan_pipeline(port.as_ref(), &wl, &options, None);

        assert_eq!(report.count(), 2);
        assert_eq!(report.signals[0].symbol, "BBB");
        assert_eq!(report.signals[0].candidate.reward_risk, 3.13);
        assert_eq!(report.signals[1].symbol, "AAA");
        assert_eq!(report.signals[1].candidate.reward_risk, 0.91);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].symbol, "MISSING.NS");
        assert_eq!(cli::scan_summary_line(&report), "Found 2 trades");

        let table = cli::format_signal_table(&report);
        assert!(table.starts_with("Stock"));
        assert_eq!(table.lines().count(), 3);
    }

    #[test]
    fn limit_stops_scan_early() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "AAA.NS", &rising(250, 0.0, 2000));
        write_csv(dir.path(), "BBB.NS", &flat_then(110.0, 111.0, 1300));

        let config = csv_config(dir.path());
        let options = cli::build_scan_options(&config, None, None).unwrap();
        let port = cli::build_data_port(&cli::build_data_settings(&config).unwrap()).unwrap();

        let report =
            cli::run_scan_pipeline(port.as_ref(), &watchlist(&["AAA.NS", "BBB.NS"]), &options, Some(1));

        assert!(report.cancelled);
        assert_eq!(report.count(), 1);
        assert_eq!(report.signals[0].symbol, "AAA");
    }

    #[test]
    fn empty_scan_prints_no_table() {
        let port = MockDataPort::new().with_error("AAA.NS", "offline");
        let options = cli::build_scan_options(&FileConfigAdapter::empty(), None, None).unwrap();
        let report = cli::run_scan_pipeline(&port, &watchlist(&["AAA.NS"]), &options, None);

        assert!(cli::format_signal_table(&report).is_empty());
        assert_eq!(cli::scan_summary_line(&report), "No trades found");
    }

    #[test]
    fn report_written_as_csv() {
        let port = MockDataPort::new()
            .with_bars("AAA.NS", rising(250, 1.0, 2000))
            .with_bars("BBB.NS", flat_then(110.0, 111.0, 1300));
        let options = cli::build_scan_options(&FileConfigAdapter::empty(), None, None).unwrap();
        let report =
            cli::run_scan_pipeline(&port, &watchlist(&["AAA.NS", "BBB.NS"]), &options, None);

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("trades.csv");
        CsvReportAdapter::new()
            .write_scan(&report, out.to_str().unwrap())
            .unwrap();

        let content = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Stock,Strategy,Entry,Stop Loss,Target,RR Ratio");
        assert_eq!(lines[1], "BBB,BB Breakout,104.97,100.50,118.94,3.13");
        assert_eq!(lines[2], "AAA,BB Breakout,125.41,124.00,128.73,2.35");
        assert_eq!(lines[3], "AAA,Golden Retrace,125.90,123.80,126.90,0.48");
    }

    #[test]
    fn analysis_output_over_csv() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "AAA.NS", &rising(250, 0.0, 2000));

        let config = csv_config(dir.path());
        let options = cli::build_scan_options(&config, None, None).unwrap();
        let port = cli::build_data_port(&cli::build_data_settings(&config).unwrap()).unwrap();

        let analysis =
            swingscan::domain::scanner::analyze(port.as_ref(), "AAA.NS", &options).unwrap();
        let text = cli::format_analysis(&analysis, &options);

        assert!(text.starts_with("AAA  250 bars"));
        assert!(text.contains("Trend:       UPTREND"));
        assert!(text.contains("Long-term:   BULLISH"));
        assert!(text.contains("Resistance:  125.90"));
        assert!(text.contains("Support:     119.00"));
        assert!(text.contains("Golden Retrace: entry 124.90, stop 123.80, target 125.90, R:R 0.91"));
    }
}
