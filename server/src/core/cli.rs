use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    ENV_ALLOW_FREEFORM_SQL, ENV_CONFIG, ENV_DEBUG, ENV_EXECUTOR_API_TOKEN, ENV_EXECUTOR_TIMEOUT_SECS,
    ENV_EXECUTOR_URL, ENV_HOST, ENV_PORT,
};

#[derive(Parser)]
#[command(name = "olapscope")]
#[command(version, about = "SQL generation gateway for log and trace exploration", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Enable debug mode (logs request params and executor payloads)
    #[arg(long, global = true, env = ENV_DEBUG)]
    pub debug: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Query executor endpoint (e.g. http://localhost:3000/api/ds/query)
    #[arg(long, global = true, env = ENV_EXECUTOR_URL)]
    pub executor_url: Option<String>,

    /// Query executor request timeout in seconds (unset = transport default)
    #[arg(long, global = true, env = ENV_EXECUTOR_TIMEOUT_SECS)]
    pub executor_timeout_secs: Option<u64>,

    /// Bearer token sent to the query executor
    #[arg(long, global = true, env = ENV_EXECUTOR_API_TOKEN)]
    pub executor_api_token: Option<String>,

    /// Allow raw SQL fragments in freeform search mode
    #[arg(long, global = true, env = ENV_ALLOW_FREEFORM_SQL)]
    pub allow_freeform_sql: Option<bool>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// Print the SQL a request body would generate, without executing it
    Sql {
        /// Query shape: table_data, top_data, table_data_charts, table_data_count,
        /// table_data_trace, surrounding_data, traces, traces_services, traces_operations
        #[arg(long, short)]
        kind: String,
        /// Path to a JSON request body ("-" reads stdin)
        #[arg(long, short, default_value = "-")]
        input: PathBuf,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub debug: bool,
    pub config: Option<PathBuf>,
    pub executor_url: Option<String>,
    pub executor_timeout_secs: Option<u64>,
    pub executor_api_token: Option<String>,
    pub allow_freeform_sql: Option<bool>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        debug: cli.debug,
        config: cli.config,
        executor_url: cli.executor_url,
        executor_timeout_secs: cli.executor_timeout_secs,
        executor_api_token: cli.executor_api_token,
        allow_freeform_sql: cli.allow_freeform_sql,
    };
    (config, cli.command)
}
