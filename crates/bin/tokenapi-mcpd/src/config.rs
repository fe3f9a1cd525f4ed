use clap::{ArgAction, Parser, builder::BoolishValueParser};
use std::error::Error;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use tokenapi_core::ClickHouseConfig;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_METRICS_PORT: u16 = 9090;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_URL: &str = "http://localhost:8123";
const DEFAULT_DATABASE: &str = "default";
const DEFAULT_USERNAME: &str = "default";
const COMMIT_LEN: usize = 7;

#[derive(Parser, Debug)]
#[command(name = "tokenapi-mcpd", version, about = "Token API MCP daemon.")]
struct CliArgs {
    /// Port of the MCP streamable HTTP listener.
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Port of the Prometheus metrics listener.
    #[arg(long, env = "METRICS_PORT", default_value_t = DEFAULT_METRICS_PORT)]
    metrics_port: u16,

    #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
    host: IpAddr,

    /// ClickHouse HTTP interface URL.
    #[arg(long, env = "URL", default_value = DEFAULT_URL)]
    url: String,

    #[arg(long, env = "DATABASE", default_value = DEFAULT_DATABASE)]
    database: String,

    #[arg(long, env = "USERNAME", default_value = DEFAULT_USERNAME)]
    username: String,

    #[arg(long, env = "PASSWORD", default_value = "", hide_env_values = true)]
    password: String,

    /// Human-readable logs instead of JSON.
    #[arg(
        long,
        env = "PRETTY_LOGGING",
        default_value_t = false,
        default_missing_value = "true",
        num_args = 0..=1,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pretty_logging: bool,

    #[arg(
        short,
        long,
        env = "VERBOSE",
        default_value_t = false,
        default_missing_value = "true",
        num_args = 0..=1,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    verbose: bool,

    /// List the usage instructions as a resource.
    #[arg(
        long,
        env = "EXPOSE_RESOURCES",
        default_value_t = false,
        default_missing_value = "true",
        num_args = 0..=1,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    expose_resources: bool,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Debug, Clone)]
pub struct McpdConfig {
    pub mcp_addr: SocketAddr,
    pub metrics_addr: SocketAddr,
    pub clickhouse: ClickHouseConfig,
    pub pretty_logging: bool,
    pub verbose: bool,
    pub expose_resources: bool,
    pub version: String,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSetting(&'static str),
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => write!(f, "missing required setting: {name}"),
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl McpdConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }
}

impl TryFrom<CliArgs> for McpdConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let url = args.url.trim().to_string();
        if url.is_empty() {
            return Err(ConfigError::MissingSetting("URL"));
        }
        if !is_http_url(&url) {
            return Err(ConfigError::InvalidSetting {
                name: "URL",
                value: url,
            });
        }

        let database = args.database.trim().to_string();
        if database.is_empty() {
            return Err(ConfigError::MissingSetting("DATABASE"));
        }

        if args.port == args.metrics_port {
            return Err(ConfigError::InvalidSetting {
                name: "METRICS_PORT",
                value: args.metrics_port.to_string(),
            });
        }

        let password = Some(args.password).filter(|value| !value.is_empty());
        let clickhouse = ClickHouseConfig::new(url)
            .with_database(database)
            .with_credentials(args.username, password);

        Ok(Self {
            mcp_addr: SocketAddr::new(args.host, args.port),
            metrics_addr: SocketAddr::new(args.host, args.metrics_port),
            clickhouse,
            pretty_logging: args.pretty_logging,
            verbose: args.verbose,
            expose_resources: args.expose_resources,
            version: app_version(
                env!("CARGO_PKG_VERSION"),
                option_env!("GIT_COMMIT"),
                option_env!("GIT_DATE"),
            ),
        })
    }
}

fn is_http_url(url: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
            && url.len() > scheme.len()
    })
}

/// `version+commit (date)`, with the commit shortened to seven characters.
/// Build metadata that is not provided is left out.
fn app_version(version: &str, commit: Option<&str>, date: Option<&str>) -> String {
    let mut rendered = version.to_string();
    if let Some(commit) = non_blank(commit) {
        rendered.push('+');
        rendered.extend(commit.chars().take(COMMIT_LEN));
    }
    if let Some(date) = non_blank(date) {
        rendered.push_str(&format!(" ({date})"));
    }
    rendered
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
