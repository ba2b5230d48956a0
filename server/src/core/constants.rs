// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "OLAPScope";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "olapscope";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".olapscope";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "olapscope.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "OLAPSCOPE_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for debug mode
pub const ENV_DEBUG: &str = "OLAPSCOPE_DEBUG";

/// Environment variable for server host
pub const ENV_HOST: &str = "OLAPSCOPE_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "OLAPSCOPE_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "OLAPSCOPE_LOG";

// =============================================================================
// Environment Variables - Query Executor
// =============================================================================

/// Environment variable for the query executor endpoint
pub const ENV_EXECUTOR_URL: &str = "OLAPSCOPE_EXECUTOR_URL";

/// Environment variable for the executor request timeout
pub const ENV_EXECUTOR_TIMEOUT_SECS: &str = "OLAPSCOPE_EXECUTOR_TIMEOUT_SECS";

/// Environment variable for the executor bearer token
pub const ENV_EXECUTOR_API_TOKEN: &str = "OLAPSCOPE_EXECUTOR_API_TOKEN";

/// Environment variable for the freeform SQL gate
pub const ENV_ALLOW_FREEFORM_SQL: &str = "OLAPSCOPE_ALLOW_FREEFORM_SQL";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5390;

/// Default request body limit (filters and freeform fragments are small)
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Graceful shutdown timeout
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Query Executor Defaults
// =============================================================================

/// Default executor endpoint (Grafana datasource query API)
pub const DEFAULT_EXECUTOR_URL: &str = "http://localhost:3000/api/ds/query";

/// Reference id attached to the single outbound sub-query
pub const EXECUTOR_REF_ID: &str = "A";

/// Result format requested from the executor
pub const EXECUTOR_FORMAT: &str = "table";

/// Header identifying the target datasource
pub const HEADER_DATASOURCE_UID: &str = "X-Datasource-Uid";

// =============================================================================
// Query Defaults
// =============================================================================

/// Maximum number of structured filters per request
pub const DEFAULT_MAX_FILTERS: usize = 50;

/// Log rows page size used when the caller sends none
pub const TABLE_ROWS_DEFAULT_PAGE_SIZE: i64 = 50;

/// Trace list page size used when the caller sends none
pub const TRACE_LIST_DEFAULT_LIMIT: i64 = 1000;

/// Attribute map column used for tag expressions
pub const SPAN_ATTRIBUTES_COLUMN: &str = "span_attributes";

/// Parameter value meaning "no filter" for service/operation/status
pub const FILTER_ALL: &str = "all";

// =============================================================================
// HTTP Surface
// =============================================================================

/// Prefix the data routes are also mounted under (Grafana plugin resource path)
pub const RESOURCES_PREFIX: &str = "/api/plugins/resources";
