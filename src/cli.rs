//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report::TextReportAdapter;
use crate::domain::baseline::Baseline;
use crate::domain::error::MoversError;
use crate::domain::interval::{FetchWindow, Interval, Period};
use crate::domain::monthly_returns::{compute_monthly_returns, pivot, MonthlyReturnRow};
use crate::domain::ranker::{rank, rank_by_category, Movers, DEFAULT_TOP};
use crate::domain::report::MoversReport;
use crate::domain::universe::{fetch_universe, parse_instruments, SkippedSymbol, Universe};
use crate::domain::variation::VariationResult;
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "movers", about = "Top and bottom movers across an instrument universe")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Flags that override `[movers]` config values.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct Overrides {
    /// Number of gainers and losers to show
    #[arg(long)]
    pub top: Option<usize>,
    /// previous_close, open, lookback:N or window_start
    #[arg(long)]
    pub baseline: Option<String>,
    /// Lookback period: Nd, Nwk, Nmo, Ny, ytd or max
    #[arg(long)]
    pub period: Option<String>,
    /// Bar interval: 1d, 1wk or 1mo
    #[arg(long)]
    pub interval: Option<String>,
    /// Last date of the window (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rank gainers and losers
    Rank {
        #[arg(short, long)]
        config: PathBuf,
        #[command(flatten)]
        overrides: Overrides,
        /// Rank each instrument category separately
        #[arg(long)]
        by_category: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Monthly returns grid for one symbol
    Heatmap {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
        /// Lookback period (defaults to max)
        #[arg(long)]
        period: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration without fetching prices
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in the configured data source
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show data range for symbol(s)
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
}

/// Resolved settings for one ranking run.
#[derive(Debug, Clone, PartialEq)]
pub struct MoversConfig {
    pub universe: Universe,
    pub baseline: Baseline,
    pub top: usize,
    pub period: Period,
    pub interval: Interval,
    pub end_date: NaiveDate,
    pub by_category: bool,
}

impl MoversConfig {
    pub fn window(&self) -> FetchWindow {
        FetchWindow::new(self.period, self.end_date, self.interval)
    }
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Rank {
            config,
            overrides,
            by_category,
            output,
        } => run_rank(&config, &overrides, by_category, output.as_deref()),
        Command::Heatmap {
            config,
            symbol,
            period,
            output,
        } => run_heatmap(&config, &symbol, period.as_deref(), output.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config } => run_list_symbols(&config),
        Command::Info { config, symbol } => run_info(&config, symbol.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, MoversError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

fn invalid(section: &str, key: &str, reason: impl ToString) -> MoversError {
    MoversError::ConfigInvalid {
        section: section.into(),
        key: key.into(),
        reason: reason.to_string(),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

pub fn parse_end_date(value: &str) -> Result<NaiveDate, MoversError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| invalid("movers", "end_date", "invalid date format (expected YYYY-MM-DD)"))
}

/// Build the run settings from config, then apply CLI overrides.
pub fn build_movers_config(
    config: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<MoversConfig, MoversError> {
    let instruments = config.get_string("universe", "instruments").ok_or_else(|| {
        MoversError::ConfigMissing {
            section: "universe".into(),
            key: "instruments".into(),
        }
    })?;
    let universe = Universe::new(parse_instruments(&instruments)?);

    let baseline_str = overrides
        .baseline
        .clone()
        .or_else(|| non_blank(config.get_string("movers", "baseline")));
    let baseline = match baseline_str {
        Some(s) => s.parse::<Baseline>().map_err(|e| invalid("movers", "baseline", e))?,
        None => Baseline::default(),
    };

    let top = match overrides.top {
        Some(top) => top,
        None => match non_blank(config.get_string("movers", "top")) {
            Some(s) => s
                .trim()
                .parse::<usize>()
                .map_err(|_| invalid("movers", "top", "expected a positive integer"))?,
            None => DEFAULT_TOP,
        },
    };
    if top == 0 {
        return Err(invalid("movers", "top", "must be at least 1"));
    }

    let period = overrides
        .period
        .clone()
        .or_else(|| non_blank(config.get_string("movers", "period")))
        .map(|s| s.parse::<Period>().map_err(|e| invalid("movers", "period", e)))
        .transpose()?
        .unwrap_or(Period::Months(1));

    let interval = overrides
        .interval
        .clone()
        .or_else(|| non_blank(config.get_string("movers", "interval")))
        .map(|s| s.parse::<Interval>().map_err(|e| invalid("movers", "interval", e)))
        .transpose()?
        .unwrap_or(Interval::OneDay);

    let end_date = match overrides
        .end_date
        .clone()
        .or_else(|| non_blank(config.get_string("movers", "end_date")))
    {
        Some(s) => parse_end_date(&s)?,
        None => chrono::Local::now().date_naive(),
    };

    Ok(MoversConfig {
        universe,
        baseline,
        top,
        period,
        interval,
        end_date,
        by_category: config.get_bool("movers", "by_category", false),
    })
}

/// Price source selected by `[data] source`.
pub fn open_price_port(config: &dyn ConfigPort) -> Result<Box<dyn PricePort>, MoversError> {
    let source = non_blank(config.get_string("data", "source")).unwrap_or_else(|| "csv".into());
    match source.to_lowercase().as_str() {
        "csv" => {
            let path = non_blank(config.get_string("data", "path")).ok_or_else(|| {
                MoversError::ConfigMissing {
                    section: "data".into(),
                    key: "path".into(),
                }
            })?;
            Ok(Box::new(CsvAdapter::new(PathBuf::from(path))))
        }
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            use crate::adapters::sqlite_adapter::SqliteAdapter;
            Ok(Box::new(SqliteAdapter::from_config(config)?))
        }
        other => Err(invalid("data", "source", format!("unsupported source '{other}'"))),
    }
}

/// Everything one ranking run produced.
#[derive(Debug, Clone)]
pub struct RankOutcome {
    pub results: Vec<VariationResult>,
    pub movers: Movers,
    pub groups: Option<Vec<(String, Movers)>>,
    pub skipped: Vec<SkippedSymbol>,
}

/// Fetch, compute variations and rank. Never fails: per-symbol problems end
/// up in `skipped` and as unavailable results.
pub fn rank_movers(port: &dyn PricePort, config: &MoversConfig) -> RankOutcome {
    let window = config.window();
    info!(
        instruments = config.universe.count(),
        baseline = %config.baseline,
        period = %config.period,
        interval = %config.interval,
        end = %config.end_date,
        "ranking movers"
    );

    let snapshot = fetch_universe(port, &config.universe, &window, &config.baseline);
    let results = snapshot.variations(&config.baseline);
    let movers = rank(&results, config.top);
    let groups = config
        .by_category
        .then(|| rank_by_category(&results, config.top));

    if movers.is_empty() {
        warn!("no instrument has a computable variation");
    }

    RankOutcome {
        results,
        movers,
        groups,
        skipped: snapshot.skipped,
    }
}

pub fn run_rank_pipeline(
    port: &dyn PricePort,
    config: &MoversConfig,
    report_port: &dyn ReportPort,
    out: &mut dyn Write,
) -> Result<RankOutcome, MoversError> {
    let outcome = rank_movers(port, config);
    let label = config.baseline.describe();

    match &outcome.groups {
        Some(groups) => {
            let reports: Vec<(String, MoversReport)> = groups
                .iter()
                .map(|(name, movers)| (name.clone(), MoversReport::new(movers, label.clone())))
                .collect();
            report_port.write_grouped(&reports, out)?;
        }
        None => report_port.write(&MoversReport::new(&outcome.movers, label), out)?,
    }
    out.flush()?;

    Ok(outcome)
}

pub fn run_heatmap_pipeline(
    port: &dyn PricePort,
    symbol: &str,
    window: &FetchWindow,
    report_port: &dyn ReportPort,
    out: &mut dyn Write,
) -> Result<Vec<MonthlyReturnRow>, MoversError> {
    let series = port.fetch_series(symbol, window)?;
    if series.is_empty() {
        return Err(MoversError::NoData {
            symbol: symbol.to_string(),
        });
    }

    let rows = pivot(&compute_monthly_returns(&series));
    report_port.write_heatmap(symbol, &rows, out)?;
    out.flush()?;
    Ok(rows)
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>, MoversError> {
    match path {
        Some(p) => Ok(Box::new(BufWriter::new(File::create(p)?))),
        None => Ok(Box::new(io::stdout().lock())),
    }
}

fn run_rank(
    config_path: &Path,
    overrides: &Overrides,
    by_category: bool,
    output: Option<&Path>,
) -> Result<(), MoversError> {
    let adapter = load_config(config_path)?;
    let mut config = build_movers_config(&adapter, overrides)?;
    config.by_category |= by_category;

    let port = open_price_port(&adapter)?;
    let mut out = open_output(output)?;
    let outcome = run_rank_pipeline(port.as_ref(), &config, &TextReportAdapter::new(), &mut out)?;

    if let Some(path) = output {
        info!(path = %path.display(), "report written");
    }
    info!(
        ranked = outcome.movers.available_count(),
        unavailable = outcome.movers.unavailable.len(),
        skipped = outcome.skipped.len(),
        "done"
    );
    Ok(())
}

/// Symbol and daily window for a heatmap run. The symbol is matched against
/// the configured universe; the period defaults to `max`.
pub fn resolve_heatmap_target(
    config: &dyn ConfigPort,
    symbol: &str,
    period: Option<&str>,
) -> Result<(String, FetchWindow), MoversError> {
    let overrides = Overrides {
        period: Some(period.unwrap_or("max").to_string()),
        ..Overrides::default()
    };
    let settings = build_movers_config(config, &overrides)?;
    let symbol = settings
        .universe
        .restrict_to(symbol)
        .symbols()
        .into_iter()
        .next()
        .unwrap_or_else(|| symbol.trim().to_uppercase());

    Ok((
        symbol,
        FetchWindow::new(settings.period, settings.end_date, Interval::OneDay),
    ))
}

fn run_heatmap(
    config_path: &Path,
    symbol: &str,
    period: Option<&str>,
    output: Option<&Path>,
) -> Result<(), MoversError> {
    let adapter = load_config(config_path)?;
    let (symbol, window) = resolve_heatmap_target(&adapter, symbol, period)?;

    let port = open_price_port(&adapter)?;
    let mut out = open_output(output)?;
    run_heatmap_pipeline(
        port.as_ref(),
        &symbol,
        &window,
        &TextReportAdapter::new(),
        &mut out,
    )?;
    Ok(())
}

/// Resolved configuration as printed by `validate`.
pub fn write_config_summary(
    config: &MoversConfig,
    source: &str,
    out: &mut dyn Write,
) -> Result<(), MoversError> {
    writeln!(out, "source:   {source}")?;
    writeln!(out, "baseline: {} ({})", config.baseline, config.baseline.describe())?;
    writeln!(out, "top:      {}", config.top)?;
    writeln!(out, "period:   {}", config.period)?;
    writeln!(out, "interval: {}", config.interval)?;
    writeln!(out, "end date: {}", config.end_date)?;
    writeln!(out, "universe: {} instruments", config.universe.count())?;
    for instrument in &config.universe.instruments {
        match &instrument.category {
            Some(category) => writeln!(out, "  {instrument} [{category}]")?,
            None => writeln!(out, "  {instrument}")?,
        }
    }
    let categories = config.universe.categories();
    if !categories.is_empty() {
        writeln!(out, "categories: {}", categories.join(", "))?;
    }
    Ok(())
}

/// Parse and print the resolved configuration without touching the data
/// source.
pub fn run_validate(config_path: &Path) -> Result<(), MoversError> {
    let adapter = load_config(config_path)?;
    let config = build_movers_config(&adapter, &Overrides::default())?;
    let source = non_blank(adapter.get_string("data", "source")).unwrap_or_else(|| "csv".into());

    let mut out = io::stdout().lock();
    write_config_summary(&config, &source, &mut out)?;
    if config.universe.is_empty() {
        warn!("instrument universe is empty; rank will report no data");
    }
    writeln!(out, "configuration is valid")?;
    Ok(())
}

fn run_list_symbols(config_path: &Path) -> Result<(), MoversError> {
    let adapter = load_config(config_path)?;
    let port = open_price_port(&adapter)?;
    let symbols = port.list_symbols()?;

    if symbols.is_empty() {
        warn!("no symbols found in data source");
    }
    for symbol in &symbols {
        println!("{symbol}");
    }
    info!(count = symbols.len(), "symbols listed");
    Ok(())
}

fn run_info(config_path: &Path, symbol: Option<&str>) -> Result<(), MoversError> {
    let adapter = load_config(config_path)?;
    let symbols = match symbol {
        Some(s) => vec![s.trim().to_uppercase()],
        None => {
            let instruments =
                non_blank(adapter.get_string("universe", "instruments")).unwrap_or_default();
            Universe::new(parse_instruments(&instruments)?).symbols()
        }
    };
    let port = open_price_port(&adapter)?;

    for s in &symbols {
        match port.get_data_range(s) {
            Ok(Some((min_date, max_date, count))) => {
                println!("{s}: {count} bars, {min_date} to {max_date}");
            }
            Ok(None) => println!("{s}: no data found"),
            Err(e) => warn!(symbol = %s, error = %e, "data range query failed"),
        }
    }
    Ok(())
}
