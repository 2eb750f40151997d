use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use sse::HubConfig;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Number of undelivered events each listener may buffer before new events
    /// are dropped for that listener
    #[arg(long, env, default_value_t = sse::config::DEFAULT_MAILBOX_CAPACITY,
        value_parser = clap::value_parser!(u64).range(1..).map(|n| n as usize))]
    pub mailbox_capacity: usize,

    /// Seconds between heartbeat events sent to every active group
    #[arg(long, env, default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..))]
    pub heartbeat_interval_secs: u64,

    /// Also send heartbeat events to listeners subscribed only as a user
    #[arg(long, env, default_value_t = false)]
    pub heartbeat_include_users: bool,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn interface(&self) -> &str {
        self.interface.as_deref().unwrap_or("127.0.0.1")
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    /// Hub tunables derived from this configuration.
    pub fn hub_config(&self) -> HubConfig {
        HubConfig::default()
            .with_mailbox_capacity(self.mailbox_capacity)
            .with_heartbeat_interval(self.heartbeat_interval())
            .with_heartbeat_include_users(self.heartbeat_include_users)
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("notification_hub").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_defaults_match_hub_defaults() {
        let config = parse(&[]);
        assert_eq!(config.hub_config(), HubConfig::default());
    }

    #[test]
    fn test_hub_config_uses_overrides() {
        let config = parse(&[
            "--mailbox-capacity",
            "5",
            "--heartbeat-interval-secs",
            "2",
            "--heartbeat-include-users",
        ]);

        let hub_config = config.hub_config();
        assert_eq!(hub_config.mailbox_capacity, 5);
        assert_eq!(hub_config.heartbeat_interval, Duration::from_secs(2));
        assert!(hub_config.heartbeat_include_users);
    }

    #[test]
    fn test_zero_capacity_and_interval_are_rejected() {
        let program = "notification_hub";
        assert!(Config::try_parse_from([program, "--mailbox-capacity", "0"]).is_err());
        assert!(Config::try_parse_from([program, "--heartbeat-interval-secs", "0"]).is_err());
    }

    #[test]
    fn test_runtime_env_parsing() {
        assert_eq!("PRODUCTION".parse::<RustEnv>(), Ok(RustEnv::Production));
        assert_eq!("staging".parse::<RustEnv>(), Ok(RustEnv::Staging));
        assert_eq!("qa".parse::<RustEnv>(), Err(RustEnvParseError));
        assert!(parse(&["--runtime-env", "production"]).is_production());
    }
}
