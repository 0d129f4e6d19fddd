//! Botdash CLI - one-shot views of the trading bot without the terminal UI.
//!
//! Commands:
//! - `snapshot` - fetch everything once and print a summary (or JSON)
//! - `stats` - statistics for one feature series
//! - `export` - write a feature series with moving averages to CSV
//! - `strategy show` / `strategy set` - inspect or update the strategy config
//! - `watch` - run the poll scheduler and print one line per snapshot

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use botdash_core::analysis::{LatestChange, SeriesAnalysis};
use botdash_core::config::{default_config_path, DashboardConfig};
use botdash_core::domain::{StrategyConfig, TimeSeriesPoint};
use botdash_core::format::{format_clock, format_currency, format_date, format_signed_pct, format_value};
use botdash_core::logging::{self, LogSink};
use botdash_core::poller::{DashboardSnapshot, PollEvent, Poller, SnapshotFetcher};
use botdash_core::source::{select_source, DataSource, SourceMode};

#[derive(Parser)]
#[command(name = "botdash", about = "Botdash CLI - trading bot metrics from the command line")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Default)]
struct GlobalArgs {
    /// Config file. Defaults to <config dir>/botdash/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data source: live, simulated, or auto.
    #[arg(long, global = true)]
    source: Option<SourceMode>,

    /// Bot API base URL, e.g. http://localhost:8080.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Seed for simulated data.
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every data kind once and print a summary.
    Snapshot {
        /// Print the full snapshot as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Summary statistics and distribution for one feature.
    Stats {
        /// Feature name, e.g. "CPU Usage".
        feature: String,
    },
    /// Write one feature series with moving averages and % change to CSV.
    Export {
        feature: String,

        /// Output file.
        #[arg(long)]
        out: PathBuf,
    },
    /// Strategy configuration commands.
    Strategy {
        #[command(subcommand)]
        action: StrategyAction,
    },
    /// Poll continuously and print one line per snapshot.
    Watch {
        /// Stop after this many snapshots.
        #[arg(long)]
        ticks: Option<u64>,
    },
}

#[derive(Subcommand)]
enum StrategyAction {
    /// Print the current strategy and its parameters.
    Show,
    /// Change parameters (name=value) and submit the result.
    Set {
        /// Assignments such as rsiPeriod=21 trailingStop=false.
        assignments: Vec<String>,

        #[arg(long, conflicts_with = "disable")]
        enable: bool,

        #[arg(long)]
        disable: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .global
        .config
        .clone()
        .unwrap_or_else(|| default_config_path(dirs::config_dir()));
    let mut config = DashboardConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    apply_overrides(&mut config, &cli.global);
    config.validate()?;

    logging::init(&config.log.level, LogSink::Stderr)?;

    match cli.command {
        Commands::Snapshot { json } => run_snapshot(&config, json),
        Commands::Stats { feature } => run_stats(&config, &feature),
        Commands::Export { feature, out } => run_export(&config, &feature, out),
        Commands::Strategy { action } => match action {
            StrategyAction::Show => run_strategy_show(&config),
            StrategyAction::Set {
                assignments,
                enable,
                disable,
            } => {
                let enabled = match (enable, disable) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                };
                run_strategy_set(&config, &assignments, enabled)
            }
        },
        Commands::Watch { ticks } => run_watch(&config, ticks),
    }
}

fn apply_overrides(config: &mut DashboardConfig, args: &GlobalArgs) {
    if let Some(mode) = args.source {
        config.source.mode = mode;
    }
    if let Some(url) = &args.base_url {
        config.api.base_url = url.clone();
    }
    if let Some(seed) = args.seed {
        config.source.seed = Some(seed);
    }
}

fn open_source(config: &DashboardConfig) -> Result<Box<dyn DataSource>> {
    select_source(config).context("selecting data source")
}

fn fetch_once(source: &dyn DataSource) -> Result<DashboardSnapshot> {
    let mut fetcher = SnapshotFetcher::new().context("building fetch pool")?;
    Ok(fetcher.fetch(source))
}

fn feature_series(source: &dyn DataSource, feature: &str) -> Result<Vec<TimeSeriesPoint>> {
    let features = source.features()?;
    if features.get(feature).is_none() {
        let names: Vec<&str> = features.names().collect();
        bail!("unknown feature '{feature}'. Available: {}", names.join(", "));
    }
    Ok(features.series(feature))
}

fn run_snapshot(config: &DashboardConfig, json: bool) -> Result<()> {
    let source = open_source(config)?;
    let snapshot = fetch_once(source.as_ref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!();
    println!("=== {} ({}) ===", source.name(), snapshot.source.label());
    println!("Fetched:  {}", format_date(snapshot.fetched_at));
    println!();
    println!("--- Features ---");
    for name in snapshot.features.names() {
        let series = snapshot.features.series(name);
        match LatestChange::of(&series) {
            Some(c) => println!(
                "{:<18} {:>14} {:>9}  ({} points)",
                name,
                format_value(name, c.current),
                format_signed_pct(c.change_pct),
                series.len()
            ),
            None => println!("{name:<18} {:>14}", "no data"),
        }
    }

    println!();
    println!("--- Position ---");
    match &snapshot.position {
        Some(p) => println!(
            "{} {:.4} @ {} now {}  P&L {} ({})",
            p.symbol,
            p.quantity,
            format_currency(p.entry_price),
            format_currency(p.current_price),
            format_currency(p.pnl),
            format_signed_pct(p.pnl_percentage)
        ),
        None => println!("No open position"),
    }
    if let Some(w) = &snapshot.wallet {
        println!();
        println!("--- Wallet ---");
        println!("Balance:   {}", format_currency(w.balance));
        println!("Available: {}", format_currency(w.available));
        println!(
            "P&L:       {} ({})",
            format_currency(w.profit_loss),
            format_signed_pct(w.profit_loss_percentage)
        );
    }

    println!();
    println!("--- Orders ({}) ---", snapshot.orders.len());
    for o in &snapshot.orders {
        println!(
            "{:<12} {:<9} {:<5} {:>10.4} {:>12} {:?}",
            o.id,
            o.symbol,
            o.side.to_string(),
            o.quantity,
            format_currency(o.price),
            o.status
        );
    }

    if let Some(s) = &snapshot.strategy {
        println!();
        println!(
            "Strategy: {} [{}]",
            s.name,
            if s.enabled { "enabled" } else { "disabled" }
        );
    }
    println!("Market:   {} points", snapshot.market.len());

    for failure in &snapshot.failures {
        println!("WARNING: {failure}");
    }
    println!();
    Ok(())
}

fn run_stats(config: &DashboardConfig, feature: &str) -> Result<()> {
    let source = open_source(config)?;
    let series = feature_series(source.as_ref(), feature)?;
    let Some(analysis) = SeriesAnalysis::compute(&series, feature) else {
        println!("{feature}: no data");
        return Ok(());
    };
    print_stats(feature, &analysis);
    Ok(())
}

fn print_stats(feature: &str, analysis: &SeriesAnalysis) {
    let s = &analysis.summary;
    let fmt = |v: f64| format_value(feature, v);

    println!();
    println!("=== {feature} ===");
    println!("Points:   {}", s.count);
    println!("Min:      {}", fmt(s.min));
    println!("Max:      {}", fmt(s.max));
    println!("Mean:     {}", fmt(s.mean));
    println!("Median:   {}", fmt(s.median));
    println!("Std Dev:  {:.4}", s.std_dev);
    println!("Range:    {}", fmt(s.range()));

    for (window, points) in &analysis.moving_averages {
        match points.last().and_then(|p| p.ma) {
            Some(ma) => println!("MA{window:<6}  {}", fmt(ma)),
            None => println!("MA{window:<6}  (not enough points)"),
        }
    }
    if let Some(pct) = analysis.percent_change.last().and_then(|p| p.percent_change) {
        println!("Last chg: {}", format_signed_pct(pct));
    }

    println!();
    println!("{:<4} {:<24} {:>6} {:>8}", "#", "Range", "Count", "Cum%");
    println!("{}", "-".repeat(45));
    for (i, (bucket, cum)) in analysis
        .distribution
        .iter()
        .zip(&analysis.cumulative)
        .enumerate()
    {
        println!(
            "{:<4} {:<24} {:>6} {:>7.1}%",
            i + 1,
            bucket.range_label,
            bucket.count,
            cum.cumulative_pct
        );
    }
    println!();
}

fn run_export(config: &DashboardConfig, feature: &str, out: PathBuf) -> Result<()> {
    let source = open_source(config)?;
    let series = feature_series(source.as_ref(), feature)?;
    let file = std::fs::File::create(&out).with_context(|| format!("creating {}", out.display()))?;
    let rows = write_export(file, &series, feature)?;
    tracing::info!(feature, rows, path = %out.display(), "exported");
    println!("Wrote {rows} rows to {}", out.display());
    Ok(())
}

/// Write `timestamp,value,ma5,ma10,ma20,pct_change` rows. Returns the row count.
fn write_export<W: Write>(writer: W, series: &[TimeSeriesPoint], feature: &str) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    let Some(analysis) = SeriesAnalysis::compute(series, feature) else {
        wtr.write_record(["timestamp", "value"])?;
        wtr.flush()?;
        return Ok(0);
    };

    let mut header = vec!["timestamp".to_string(), "value".to_string()];
    header.extend(analysis.moving_averages.iter().map(|(w, _)| format!("ma{w}")));
    header.push("pct_change".to_string());
    wtr.write_record(&header)?;

    let opt = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
    for (i, point) in series.iter().enumerate() {
        let mut record = vec![point.timestamp.to_rfc3339(), point.value.to_string()];
        for (_, ma) in &analysis.moving_averages {
            record.push(opt(ma.get(i).and_then(|p| p.ma)));
        }
        record.push(opt(analysis.percent_change.get(i).and_then(|p| p.percent_change)));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(series.len())
}

fn run_strategy_show(config: &DashboardConfig) -> Result<()> {
    let source = open_source(config)?;
    let strategy = source.strategy()?;
    print_strategy(&strategy);
    Ok(())
}

fn print_strategy(s: &StrategyConfig) {
    println!();
    println!("=== {} ===", s.name);
    if !s.description.is_empty() {
        println!("{}", s.description);
    }
    println!("Status:  {}", if s.enabled { "ENABLED" } else { "DISABLED" });
    println!("Updated: {}", format_date(s.last_updated));
    println!();
    println!("{:<16} {:>12} {:>16}  {}", "Parameter", "Value", "Range", "Description");
    println!("{}", "-".repeat(72));
    for (name, p) in &s.parameters {
        let range = match (p.min, p.max) {
            (Some(lo), Some(hi)) => format!("{lo}..{hi}"),
            (Some(lo), None) => format!(">= {lo}"),
            (None, Some(hi)) => format!("<= {hi}"),
            (None, None) => String::new(),
        };
        println!(
            "{:<16} {:>12} {:>16}  {}",
            name,
            p.value.to_string(),
            range,
            p.description
        );
    }
    println!();
}

/// Split `name=value`.
fn parse_assignment(s: &str) -> Result<(&str, &str)> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value)),
        _ => bail!("expected name=value, got '{s}'"),
    }
}

/// Apply assignments and the enabled switch to a copy of `current`.
fn edit_strategy(
    current: &StrategyConfig,
    assignments: &[String],
    enabled: Option<bool>,
) -> Result<StrategyConfig> {
    let mut cfg = current.clone();
    for a in assignments {
        let (name, value) = parse_assignment(a)?;
        cfg.set_parameter_str(name, value)?;
    }
    if let Some(e) = enabled {
        cfg.enabled = e;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn run_strategy_set(
    config: &DashboardConfig,
    assignments: &[String],
    enabled: Option<bool>,
) -> Result<()> {
    if assignments.is_empty() && enabled.is_none() {
        bail!("nothing to change: pass name=value pairs, --enable, or --disable");
    }
    let source = open_source(config)?;
    let current = source.strategy()?;
    let edited = edit_strategy(&current, assignments, enabled)?;
    let stored = source
        .update_strategy(&edited)
        .context("submitting strategy")?;
    println!("Strategy \"{}\" updated", stored.name);
    print_strategy(&stored);
    Ok(())
}

fn run_watch(config: &DashboardConfig, ticks: Option<u64>) -> Result<()> {
    let source = open_source(config)?;
    let interval = config.poll.interval();
    println!(
        "Watching {} every {}s (Ctrl-C to stop)",
        source.kind().label(),
        interval.as_secs()
    );
    let mut poller = Poller::spawn(source, interval).context("starting poller")?;
    let result = watch_loop(&poller, interval * 2, ticks, &mut std::io::stdout().lock());
    poller.shutdown();
    result.map(|_| ())
}

/// Print snapshots until `ticks` have been seen. Fails if the scheduler dies.
fn watch_loop<W: Write>(
    poller: &Poller,
    wait: Duration,
    ticks: Option<u64>,
    out: &mut W,
) -> Result<u64> {
    let mut seen = 0u64;
    while ticks.map_or(true, |n| seen < n) {
        let Some(event) = poller
            .recv_timeout(wait)
            .with_context(|| format!("after {seen} snapshot(s)"))?
        else {
            continue;
        };
        if let PollEvent::Snapshot(snapshot) = event {
            seen += 1;
            writeln!(out, "{}", watch_line(&snapshot))?;
            for failure in &snapshot.failures {
                writeln!(out, "  WARNING: {failure}")?;
            }
        }
    }
    Ok(seen)
}

fn watch_line(snapshot: &DashboardSnapshot) -> String {
    let changed = if snapshot.changed_features.is_empty() {
        "no changes".to_string()
    } else {
        snapshot
            .changed_features
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let balance = snapshot
        .wallet
        .as_ref()
        .map(|w| format_currency(w.balance))
        .unwrap_or_else(|| "-".into());
    format!(
        "#{:<4} {}  balance {}  orders {}  changed: {}",
        snapshot.seq,
        format_clock(snapshot.fetched_at),
        balance,
        snapshot.orders.len(),
        changed
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use botdash_core::domain::ParamValue;
    use botdash_core::source::{SimulatedSource, SourceError};

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "botdash", "stats", "CPU Usage", "--source", "simulated", "--seed", "7",
        ])
        .unwrap();
        assert_eq!(cli.global.source, Some(SourceMode::Simulated));
        assert_eq!(cli.global.seed, Some(7));
        assert!(matches!(cli.command, Commands::Stats { ref feature } if feature == "CPU Usage"));
    }

    #[test]
    fn enable_and_disable_conflict() {
        let parsed = Cli::try_parse_from(["botdash", "strategy", "set", "--enable", "--disable"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut cfg = DashboardConfig::default();
        let args = GlobalArgs {
            source: Some(SourceMode::Live),
            base_url: Some("https://bot.example".into()),
            seed: Some(3),
            ..Default::default()
        };
        apply_overrides(&mut cfg, &args);
        assert_eq!(cfg.source.mode, SourceMode::Live);
        assert_eq!(cfg.api.base_url, "https://bot.example");
        assert_eq!(cfg.source.seed, Some(3));
    }

    #[test]
    fn assignment_parsing() {
        assert_eq!(parse_assignment("rsiPeriod=21").unwrap(), ("rsiPeriod", "21"));
        assert_eq!(parse_assignment("tradingPair=ETH/USD").unwrap(), ("tradingPair", "ETH/USD"));
        assert!(parse_assignment("rsiPeriod").is_err());
        assert!(parse_assignment("=5").is_err());
    }

    #[test]
    fn edit_strategy_applies_and_validates() {
        let current = SimulatedSource::with_seed(1).strategy().unwrap();
        let edited = edit_strategy(
            &current,
            &["rsiPeriod=21".into(), "trailingStop=off".into()],
            Some(false),
        )
        .unwrap();
        assert_eq!(edited.parameters["rsiPeriod"].value, ParamValue::Number(21.0));
        assert_eq!(edited.parameters["trailingStop"].value, ParamValue::Boolean(false));
        assert!(!edited.enabled);

        assert!(edit_strategy(&current, &["rsiPeriod=500".into()], None).is_err());
        assert!(edit_strategy(&current, &["nope=1".into()], None).is_err());
    }

    #[test]
    fn export_writes_header_and_rows() {
        let source = SimulatedSource::with_seed(9);
        let series = feature_series(&source, "CPU Usage").unwrap();
        let mut buf = Vec::new();
        let rows = write_export(&mut buf, &series, "CPU Usage").unwrap();
        assert_eq!(rows, series.len());

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "timestamp,value,ma5,ma10,ma20,pct_change");
        assert_eq!(lines.len(), series.len() + 1);
        // Moving averages are blank until their window fills.
        assert!(lines[1].contains(",,,"));
    }

    #[test]
    fn export_of_empty_series() {
        let mut buf = Vec::new();
        let rows = write_export(&mut buf, &[], "CPU Usage").unwrap();
        assert_eq!(rows, 0);
        assert_eq!(String::from_utf8(buf).unwrap().trim(), "timestamp,value");
    }

    #[test]
    fn unknown_feature_lists_available() {
        let source = SimulatedSource::with_seed(9);
        let err = feature_series(&source, "Bogus").unwrap_err().to_string();
        assert!(err.contains("CPU Usage"));
    }

    #[test]
    fn watch_line_mentions_changes() {
        let mut fetcher = SnapshotFetcher::new().unwrap();
        let snap = fetcher.fetch(&SimulatedSource::with_seed(4));
        let line = watch_line(&snap);
        assert!(line.starts_with("#1"));
        assert!(line.contains("CPU Usage"));
    }

    #[test]
    fn watch_stops_after_requested_ticks() {
        let poller =
            Poller::spawn(Box::new(SimulatedSource::with_seed(3)), Duration::from_millis(20)).unwrap();
        let mut out = Vec::new();
        let seen = watch_loop(&poller, Duration::from_secs(5), Some(2), &mut out).unwrap();
        assert_eq!(seen, 2);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("#1"));
        assert!(text.contains("#2"));
    }

    /// Simulated data, except every features fetch panics.
    struct PanickingFeatures(SimulatedSource);

    impl DataSource for PanickingFeatures {
        fn name(&self) -> &str {
            "panicking"
        }
        fn kind(&self) -> botdash_core::source::SourceKind {
            self.0.kind()
        }
        fn features(&self) -> Result<botdash_core::domain::FeatureSet, SourceError> {
            panic!("features endpoint exploded");
        }
        fn position(&self) -> Result<Option<botdash_core::domain::Position>, SourceError> {
            self.0.position()
        }
        fn orders(&self) -> Result<Vec<botdash_core::domain::Order>, SourceError> {
            self.0.orders()
        }
        fn strategy(&self) -> Result<StrategyConfig, SourceError> {
            self.0.strategy()
        }
        fn update_strategy(&self, config: &StrategyConfig) -> Result<StrategyConfig, SourceError> {
            self.0.update_strategy(config)
        }
        fn wallet(&self) -> Result<botdash_core::domain::Wallet, SourceError> {
            self.0.wallet()
        }
        fn market(&self) -> Result<Vec<botdash_core::domain::MarketPoint>, SourceError> {
            self.0.market()
        }
        fn probe(&self) -> bool {
            true
        }
    }

    #[test]
    fn watch_fails_when_scheduler_dies() {
        let poller = Poller::spawn(
            Box::new(PanickingFeatures(SimulatedSource::with_seed(3))),
            Duration::from_secs(3600),
        )
        .unwrap();
        let started = std::time::Instant::now();
        let mut out = Vec::new();
        let err = watch_loop(&poller, Duration::from_secs(30), Some(3), &mut out).unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(30));
        assert!(format!("{err:#}").contains("poll scheduler stopped"));
        assert!(out.is_empty());
    }
}
