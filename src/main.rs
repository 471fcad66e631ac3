use analytics::{HistoryRow, PerformanceReport};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::Settings;
use core_types::{AnalysisRequest, Period};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::process::ExitCode;

/// The main entry point for the FinAgent application.
#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file, if there is one.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = configuration::load_config(&cli.config)?;
    let _guard = configuration::init_tracing(&settings.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Analyze(args) => handle_analyze(args, &settings).await,
        Commands::Serve(args) => handle_serve(args, settings).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Stock performance metrics and trend narrative from daily price history.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. A missing file means defaults.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse one ticker and print the report.
    Analyze(AnalyzeArgs),
    /// Run the HTTP analysis service.
    Serve(ServeArgs),
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// The symbol to analyse (e.g., "AAPL").
    #[arg(long)]
    ticker: String,

    /// Look-back window: 1y, 2y, 5y or 10y.
    #[arg(long, conflicts_with_all = ["start", "end"])]
    period: Option<Period>,

    /// First date of an explicit range (format: YYYY-MM-DD).
    #[arg(long, requires = "end")]
    start: Option<NaiveDate>,

    /// Last date of an explicit range (format: YYYY-MM-DD).
    #[arg(long, requires = "start")]
    end: Option<NaiveDate>,

    /// Annual risk-free rate as a fraction, overriding the configured one.
    #[arg(long)]
    risk_free_rate: Option<f64>,

    /// Print the report as JSON instead of tables.
    #[arg(long)]
    json: bool,

    /// Number of most recent history rows to show.
    #[arg(long, default_value_t = 10)]
    history: usize,
}

#[derive(Parser)]
struct ServeArgs {
    /// Overrides `server.host`.
    #[arg(long)]
    host: Option<String>,

    /// Overrides `server.port`.
    #[arg(long)]
    port: Option<u16>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_analyze(args: AnalyzeArgs, settings: &Settings) -> anyhow::Result<()> {
    let request = AnalysisRequest {
        ticker: args.ticker,
        period: args.period,
        start: args.start,
        end: args.end,
        risk_free_rate: args.risk_free_rate,
    };

    let source = web_server::build_source(settings).await?;
    let today = Utc::now().date_naive();
    let report =
        web_server::service::analyze(source.as_ref(), &request, &settings.analysis, today).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, args.history);
    }
    Ok(())
}

async fn handle_serve(args: ServeArgs, mut settings: Settings) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        settings.server.host = host;
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    settings.validate()?;
    web_server::run_server(settings).await
}

// ==============================================================================
// Terminal Output
// ==============================================================================

fn print_report(report: &PerformanceReport, history_rows: usize) {
    println!("\n{} ({})", report.ticker, report.period);

    let mut kpis = Table::new();
    kpis.set_header(vec!["Metric", "Value"]);
    kpis.add_row(vec!["Total Return".to_string(), percent(report.total_return_pct)]);
    kpis.add_row(vec!["CAGR".to_string(), percent(report.cagr_pct)]);
    kpis.add_row(vec!["Volatility".to_string(), percent(report.volatility_pct)]);
    kpis.add_row(vec!["Sharpe Ratio".to_string(), number(report.sharpe_ratio)]);
    kpis.add_row(vec!["Max Drawdown".to_string(), percent(report.max_drawdown_pct)]);
    println!("{kpis}");

    println!("\n{}", report.analysis);
    for note in &report.diagnostics {
        println!("  ! {}", note);
    }

    if history_rows == 0 || report.history.is_empty() {
        return;
    }
    let skip = report.history.len().saturating_sub(history_rows);
    let mut history = Table::new();
    history.set_header(vec!["Date", "Close", "Volume", "MA5", "MA20", "MA60", "RSI14"]);
    for row in &report.history[skip..] {
        history.add_row(history_cells(row));
    }
    println!("\n{history}");
}

fn history_cells(row: &HistoryRow) -> Vec<String> {
    vec![
        row.date.to_string(),
        number(row.close),
        number(row.volume),
        number(row.ma5),
        number(row.ma20),
        number(row.ma60),
        number(row.rsi14),
    ]
}

fn number(value: Option<Decimal>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn percent(value: Option<Decimal>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{}%", v))
}
