//! TeamPulse CLI: opens one metric view against the analytics API and
//! prints it.
//!
//! Usage: `teampulse [--base-url URL] [--timeout-secs N] [--json] [--stats] <VIEW>`

use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use teampulse_lib::config::{load_config, ConfigOverrides};
use teampulse_lib::metrics::{BurnoutRecord, CollaborationRecord, ProductivityRecord};
use teampulse_lib::report::ViewReport;
use teampulse_lib::{ApiClient, MetricDomain, MetricRecord, ViewController};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ViewArg {
    Productivity,
    Burnout,
    Collaboration,
}

impl From<ViewArg> for MetricDomain {
    fn from(arg: ViewArg) -> Self {
        match arg {
            ViewArg::Productivity => MetricDomain::Productivity,
            ViewArg::Burnout => MetricDomain::Burnout,
            ViewArg::Collaboration => MetricDomain::Collaboration,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "teampulse", version, about = "Developer productivity intelligence")]
struct Cli {
    /// Which metric view to open.
    #[arg(value_enum)]
    view: ViewArg,

    /// Analytics API base URL, including the version prefix.
    #[arg(long)]
    base_url: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print the view report as JSON instead of a table.
    #[arg(long)]
    json: bool,

    /// Log per-endpoint request statistics after the view settles.
    #[arg(long)]
    stats: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let flags = ConfigOverrides {
        base_url: cli.base_url.clone(),
        request_timeout_secs: cli.timeout_secs,
    };
    let config = match load_config(&flags) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::from(2);
        }
    };

    let client = match ApiClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::from(2);
        }
    };

    let code = match MetricDomain::from(cli.view) {
        MetricDomain::Productivity => show::<ProductivityRecord>(&client, cli.json).await,
        MetricDomain::Burnout => show::<BurnoutRecord>(&client, cli.json).await,
        MetricDomain::Collaboration => show::<CollaborationRecord>(&client, cli.json).await,
    };

    if cli.stats {
        for row in client.stats().snapshot().endpoints {
            log::info!(
                "{}: {} requests ({} failed, {} timed out) median={}ms p95={}ms slowest={}ms fallbacks={}/{}",
                row.endpoint.label(),
                row.requests(),
                row.failed,
                row.timed_out,
                row.median_ms,
                row.p95_ms,
                row.slowest_ms,
                row.fallbacks,
                row.developers
            );
        }
    }

    code
}

async fn show<R: MetricRecord>(client: &ApiClient, json: bool) -> ExitCode {
    let view = ViewController::<R>::new(client.clone());
    eprintln!("{}", R::DOMAIN.loading_message());
    let snapshot = view.load().await;

    if let Some(error) = snapshot.error {
        if json {
            println!("{}", serde_json::to_string_pretty(&error).unwrap_or_default());
        } else {
            eprintln!("{}", error.message);
            eprintln!("  {}", error.detail);
            eprintln!("  {}", error.recovery_suggestion);
        }
        return ExitCode::FAILURE;
    }

    let Some(data) = snapshot.data else {
        return ExitCode::FAILURE;
    };
    let report = ViewReport::from_data(&*data);
    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Failed to serialize report: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        print!("{}", report.render_table());
    }
    ExitCode::SUCCESS
}
