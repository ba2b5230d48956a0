//! Core application

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::core::banner;
use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::data::executor::{HttpQueryExecutor, QueryBackend};
use crate::domain::sql::QueryKind;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub backend: Arc<dyn QueryBackend>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();

        let (cli_config, command) = cli::parse();
        Self::init_logging(cli_config.debug);

        tracing::debug!("Application starting");
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::Sql { kind, input }) => return Self::print_sql(&kind, &input),
            Some(Commands::Start) | None => {}
        }

        let app = Self::init(&cli_config)?;
        Self::start_server(app).await
    }

    fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let executor = HttpQueryExecutor::new(&config.executor)
            .context("Failed to initialize query executor client")?;

        Ok(Self {
            shutdown: ShutdownService::new(),
            config,
            backend: Arc::new(executor),
        })
    }

    /// Build the statement for a request body and print it
    fn print_sql(kind: &str, input: &Path) -> Result<()> {
        let kind: QueryKind = kind.parse()?;

        let mut body = Vec::new();
        if input.as_os_str() == "-" {
            std::io::stdin()
                .read_to_end(&mut body)
                .context("Failed to read request body from stdin")?;
        } else {
            body = std::fs::read(input)
                .with_context(|| format!("Failed to read request body: {}", input.display()))?;
        }

        let sql = kind.render(&body)?;
        tracing::debug!(kind = %kind, "Statement rendered");
        println!("{}", sql);
        Ok(())
    }

    fn init_logging(debug: bool) {
        let default_filter = if debug {
            format!("info,{}=debug", APP_NAME_LOWER)
        } else {
            format!("info,{}=info", APP_NAME_LOWER)
        };

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        banner::print_banner(&app.config);

        let server = ApiServer::new(app);
        let app = server.start().await?;
        tracing::debug!(triggered = app.shutdown.is_triggered(), "Server stopped");

        Ok(())
    }
}
