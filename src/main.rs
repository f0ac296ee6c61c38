//! Facility directory: record builder CLI and search server.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use facility_directory::batch::build_all;
use facility_directory::builder::{build_municipalities, BuildReport, Builder};
use facility_directory::config::AppConfig;
use facility_directory::municipality::MunicipalityIndex;
use facility_directory::query::QueryService;
use facility_directory::routes::{router, AppState};
use facility_directory::sheet_parser::read_csv;
use facility_directory::source;
use facility_directory::tables::Category;

#[derive(Parser)]
#[command(name = "facility-directory", version, about)]
struct Cli {
    /// Directory holding medical/, care/ and pref/ (overrides configuration).
    #[arg(long, global = true)]
    data_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the search API.
    Serve {
        #[arg(long)]
        bind: Option<String>,
    },
    /// Hospital, clinic or dental: facility table plus optional hours table.
    BuildMedical {
        #[arg(long)]
        kind: String,
        #[arg(long)]
        facility: PathBuf,
        #[arg(long)]
        hours: Option<PathBuf>,
        /// Phone table (ID first); fills records with no usable number.
        #[arg(long)]
        tel: Option<PathBuf>,
    },
    /// Hospital, clinic, dental and pharmacy from the newest `YYYY-MM-DD`
    /// release under an MHLW export directory.
    BuildAll {
        #[arg(long)]
        mhlw_dir: PathBuf,
    },
    /// Pharmacy table with per-day opening slots.
    BuildPharmacy {
        #[arg(long)]
        input: PathBuf,
    },
    /// One long-term-care service table.
    BuildCare {
        #[arg(long)]
        kind: String,
        #[arg(long)]
        input: PathBuf,
    },
    /// Municipality lists from a JIS municipality code table.
    BuildMunicipalities {
        #[arg(long)]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "facility_directory=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Failed to load configuration")?;
    if let Some(root) = cli.data_root {
        config.data_root = root;
    }

    match cli.command {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            serve(config).await
        }
        Command::BuildMedical { kind, facility, hours, tel } => {
            let category = parse_kind(&kind)?;
            let index = load_index(&config.data_root)?;
            let facility = read_csv(&facility)?;
            let hours = hours.as_deref().map(read_csv).transpose()?;
            let tel = tel.as_deref().map(read_csv).transpose()?;
            let report = Builder::new(&config.data_root, &index)
                .build_medical(category, &facility, hours.as_ref(), tel.as_ref())?;
            log_report(category.slug(), &report);
            Ok(())
        }
        Command::BuildAll { mhlw_dir } => {
            let index = load_index(&config.data_root)?;
            let reports = build_all(&config.data_root, &index, &mhlw_dir)
                .with_context(|| format!("Failed to build from {:?}", mhlw_dir))?;
            for (category, report) in &reports {
                log_report(category.slug(), report);
            }
            Ok(())
        }
        Command::BuildPharmacy { input } => {
            let index = load_index(&config.data_root)?;
            let sheet = read_csv(&input)?;
            let report = Builder::new(&config.data_root, &index).build_pharmacy(&sheet)?;
            log_report(Category::Pharmacy.slug(), &report);
            Ok(())
        }
        Command::BuildCare { kind, input } => {
            let category = parse_kind(&kind)?;
            let index = load_index(&config.data_root)?;
            let sheet = read_csv(&input)?;
            let report = Builder::new(&config.data_root, &index).build_care(category, &sheet)?;
            log_report(category.slug(), &report);
            Ok(())
        }
        Command::BuildMunicipalities { input } => {
            let sheet = read_csv(&input)?;
            let report = build_municipalities(&config.data_root, &sheet)?;
            log_report("municipalities", &report);
            Ok(())
        }
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let index = Arc::new(load_index(&config.data_root)?);
    let source = source::from_config(&config);
    info!("Reading category files via {} source", source.name());

    let query = QueryService::new(source, index, &config);
    let app = router(AppState { query: Arc::new(query) });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Server listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn parse_kind(kind: &str) -> anyhow::Result<Category> {
    Ok(Category::resolve(kind)
        .ok_or_else(|| facility_directory::error::EtlError::UnknownCategory(kind.to_string()))?)
}

fn load_index(data_root: &Path) -> anyhow::Result<MunicipalityIndex> {
    MunicipalityIndex::load(data_root)
        .with_context(|| format!("Failed to load municipality lists under {:?}", data_root))
}

fn log_report(what: &str, report: &BuildReport) {
    info!(
        "{}: {} records in {} files ({} rows skipped, {} duplicate IDs)",
        what,
        report.records,
        report.files.len(),
        report.skipped_rows,
        report.duplicate_ids
    );
}
