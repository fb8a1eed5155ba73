//! CLI definition and dispatch.

use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use crate::adapters::csv_adapter::{self, CsvAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report::JsonReport;
use crate::adapters::memory_adapter::MemoryAdapter;
use crate::adapters::text_report::{TextReport, format_currency};
use crate::domain::config_validation::validate_config;
use crate::domain::error::BrandspendError;
use crate::domain::listing::ListingConfig;
use crate::domain::summary::SummaryConfig;
use crate::domain::summary_service;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "brandspend", about = "Brand advertising spend summaries")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the spend summary
    Summary {
        #[arg(short, long)]
        config: PathBuf,
        /// Number of top brands to show (overrides [summary] top_n)
        #[arg(long)]
        top: Option<usize>,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List brands
    Brands {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        limit: Option<i64>,
    },
    /// List daily spend rows
    DailySpend {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        limit: Option<i64>,
    },
    /// Load transaction records from a CSV file into the SQLite store
    Import {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        csv: PathBuf,
    },
    /// Start the web server
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
}

impl Command {
    fn config_path(&self) -> &Path {
        match self {
            Command::Summary { config, .. }
            | Command::Brands { config, .. }
            | Command::DailySpend { config, .. }
            | Command::Import { config, .. }
            | Command::Serve { config } => config.as_path(),
        }
    }
}

fn fail(err: BrandspendError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

pub fn run(cli: Cli) -> ExitCode {
    let config = match load_config(cli.command.config_path()) {
        Ok(c) => c,
        Err(code) => return code,
    };
    init_logging(&config);

    if let Err(e) = validate_config(&config) {
        return fail(e);
    }

    match cli.command {
        Command::Summary { top, format, .. } => run_summary(&config, top, format),
        Command::Brands { limit, .. } => run_brands(&config, limit),
        Command::DailySpend { limit, .. } => run_daily_spend(&config, limit),
        Command::Import { csv, .. } => run_import(&config, &csv),
        Command::Serve { .. } => run_serve(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(fail)
}

/// Install the global subscriber. `RUST_LOG` wins over `[logging] level`.
pub fn init_logging(config: &dyn ConfigPort) {
    use tracing_subscriber::EnvFilter;

    let level = config
        .get_string("logging", "level")
        .unwrap_or_else(|| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let ansi = config.get_bool("logging", "ansi", true);

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(ansi)
        .try_init();
}

pub fn build_summary_config(config: &dyn ConfigPort) -> SummaryConfig {
    let top_n = config.get_int("summary", "top_n", SummaryConfig::default().top_n as i64);
    SummaryConfig {
        top_n: usize::try_from(top_n).unwrap_or(1).max(1),
    }
}

pub fn build_listing_config(config: &dyn ConfigPort) -> ListingConfig {
    let defaults = ListingConfig::default();
    let default_limit = config.get_int("listing", "default_limit", defaults.default_limit as i64);
    let max_limit = config.get_int("listing", "max_limit", defaults.max_limit as i64);
    ListingConfig {
        default_limit: usize::try_from(default_limit).unwrap_or(1).max(1),
        max_limit: usize::try_from(max_limit).unwrap_or(1).max(1),
    }
}

fn required(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, BrandspendError> {
    config
        .get_string(section, key)
        .ok_or_else(|| BrandspendError::ConfigMissing {
            section: section.into(),
            key: key.into(),
        })
}

#[cfg(not(all(feature = "sqlite", feature = "postgres")))]
fn feature_missing(backend: &str, feature: &str) -> BrandspendError {
    BrandspendError::ConfigInvalid {
        section: "database".into(),
        key: "backend".into(),
        reason: format!("{backend} backend requires the {feature} feature"),
    }
}

/// Open the record store selected by `[database] backend`.
pub fn open_data_port(
    config: &dyn ConfigPort,
) -> Result<Arc<dyn DataPort + Send + Sync>, BrandspendError> {
    let backend = config
        .get_string("database", "backend")
        .unwrap_or_else(|| "sqlite".to_string())
        .to_lowercase();
    tracing::debug!(%backend, "opening record store");

    match backend.as_str() {
        "sqlite" => {
            #[cfg(feature = "sqlite")]
            {
                use crate::adapters::sqlite_adapter::SqliteAdapter;
                let adapter = SqliteAdapter::from_config(config)?;
                adapter.initialize_schema()?;
                Ok(Arc::new(adapter))
            }
            #[cfg(not(feature = "sqlite"))]
            {
                Err(feature_missing("sqlite", "sqlite"))
            }
        }
        "postgres" => {
            #[cfg(feature = "postgres")]
            {
                use crate::adapters::postgres_adapter::PostgresAdapter;
                Ok(Arc::new(PostgresAdapter::from_config(config)?))
            }
            #[cfg(not(feature = "postgres"))]
            {
                Err(feature_missing("postgres", "postgres"))
            }
        }
        "csv" => {
            let path = required(config, "csv", "path")?;
            Ok(Arc::new(CsvAdapter::new(PathBuf::from(path))))
        }
        "memory" => {
            let records = match config.get_string("csv", "path") {
                Some(path) => csv_adapter::read_records(File::open(&path)?)?,
                None => Vec::new(),
            };
            tracing::info!(records = records.len(), "seeded in-memory store");
            Ok(Arc::new(MemoryAdapter::new(records)))
        }
        other => Err(BrandspendError::ConfigInvalid {
            section: "database".into(),
            key: "backend".into(),
            reason: format!("unknown backend {other:?}"),
        }),
    }
}

pub fn run_summary(config: &dyn ConfigPort, top: Option<usize>, format: OutputFormat) -> ExitCode {
    let mut summary_config = build_summary_config(config);
    if let Some(n) = top {
        if n == 0 {
            return fail(BrandspendError::ConfigInvalid {
                section: "summary".into(),
                key: "top_n".into(),
                reason: "--top must be at least 1".into(),
            });
        }
        summary_config.top_n = n;
    }

    let port = match open_data_port(config) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };

    let summary = match summary_service::get_summary(&*port, &summary_config) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    let report: Box<dyn ReportPort> = match format {
        OutputFormat::Text => Box::new(TextReport),
        OutputFormat::Json => Box::new(JsonReport { pretty: true }),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match report.write(&summary, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(e),
    }
}

fn run_brands(config: &dyn ConfigPort, limit: Option<i64>) -> ExitCode {
    let limit = build_listing_config(config).clamp(limit);
    let port = match open_data_port(config) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };

    let brands = match port.list_brands(limit) {
        Ok(b) => b,
        Err(e) => return fail(e.into_unavailable()),
    };

    if brands.is_empty() {
        eprintln!("No brands found");
        return ExitCode::SUCCESS;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for brand in &brands {
        if let Err(e) = writeln!(
            out,
            "{}\t{} - {}",
            brand.brand_id, brand.brand_name, brand.industry_name
        ) {
            return fail(e.into());
        }
    }
    ExitCode::SUCCESS
}

fn run_daily_spend(config: &dyn ConfigPort, limit: Option<i64>) -> ExitCode {
    let limit = build_listing_config(config).clamp(limit);
    let port = match open_data_port(config) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };

    let spends = match port.list_daily_spend(limit) {
        Ok(s) => s,
        Err(e) => return fail(e.into_unavailable()),
    };

    if spends.is_empty() {
        eprintln!("No spend rows found");
        return ExitCode::SUCCESS;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for spend in &spends {
        let date = spend
            .spend_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        if let Err(e) = writeln!(
            out,
            "{}\t{} - {}",
            date,
            spend.brand_name,
            format_currency(spend.spend_amount)
        ) {
            return fail(e.into());
        }
    }
    ExitCode::SUCCESS
}

fn run_import(config: &dyn ConfigPort, csv_path: &Path) -> ExitCode {
    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::sqlite_adapter::SqliteAdapter;

        let file = match File::open(csv_path) {
            Ok(f) => f,
            Err(e) => return fail(e.into()),
        };
        let records = match csv_adapter::read_records(file) {
            Ok(r) => r,
            Err(e) => return fail(e),
        };

        let adapter = match SqliteAdapter::from_config(config) {
            Ok(a) => a,
            Err(e) => return fail(e),
        };
        if let Err(e) = adapter.initialize_schema() {
            return fail(e);
        }

        match adapter.insert_records(&records) {
            Ok(count) => {
                eprintln!("Imported {} records from {}", count, csv_path.display());
                ExitCode::SUCCESS
            }
            Err(e) => fail(e),
        }
    }

    #[cfg(not(feature = "sqlite"))]
    {
        let _ = (config, csv_path);
        eprintln!("error: sqlite feature is required for import");
        ExitCode::from(1)
    }
}

fn run_serve(config: &dyn ConfigPort) -> ExitCode {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{AppState, build_router, cors_layer};
        use std::net::SocketAddr;

        let data_port = match open_data_port(config) {
            Ok(p) => p,
            Err(e) => return fail(e),
        };

        let listen = config
            .get_string("web", "listen")
            .unwrap_or_else(|| "127.0.0.1:5001".to_string());
        let addr: SocketAddr = match listen.parse() {
            Ok(a) => a,
            Err(e) => {
                return fail(BrandspendError::ConfigInvalid {
                    section: "web".into(),
                    key: "listen".into(),
                    reason: format!("{e}"),
                });
            }
        };

        let state = AppState {
            data_port,
            summary: build_summary_config(config),
            listing: build_listing_config(config),
        };
        let allowed_origin = config.get_string("web", "allowed_origin");
        let router = build_router(state).layer(cors_layer(allowed_origin.as_deref()));

        let runtime = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => return fail(e.into()),
        };

        let result: io::Result<()> = runtime.block_on(async {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::info!(%addr, "listening");
            axum::serve(listener, router).await
        });

        match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => fail(e.into()),
        }
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = config;
        eprintln!("error: web feature is required for serve");
        ExitCode::from(1)
    }
}
