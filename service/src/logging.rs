use crate::config::{Config, RustEnv};
use log::{LevelFilter, SetLoggerError};
use simplelog::{self, ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Dependency modules that are silenced unless the log level is Trace. The HTTP
/// stack logs every accepted connection, which drowns out hub lifecycle logs on a
/// server holding thousands of long-lived streams.
const FILTERED_MODULES: &[&str] = &["tower", "tower_http", "hyper", "hyper_util", "axum", "h2"];

pub struct Logger {}

impl Logger {
    /// Installs the global terminal logger configured from `config`.
    ///
    /// Trace shows everything including dependency logs; every other level
    /// filters the noisy HTTP modules. Colors are disabled in production, where
    /// output goes to a log collector rather than a terminal.
    pub fn init_logger(config: &Config) -> Result<(), SetLoggerError> {
        let log_config = Self::build_log_config(Self::should_filter_dependencies(
            config.log_level_filter,
        ));

        TermLogger::init(
            config.log_level_filter,
            log_config,
            TerminalMode::Mixed,
            Self::color_choice(&config.runtime_env),
        )
    }

    /// Returns `false` for Trace level (show all logs), `true` for all other levels.
    fn should_filter_dependencies(level: LevelFilter) -> bool {
        level != LevelFilter::Trace
    }

    fn color_choice(runtime_env: &RustEnv) -> ColorChoice {
        match runtime_env {
            RustEnv::Production => ColorChoice::Never,
            RustEnv::Development | RustEnv::Staging => ColorChoice::Auto,
        }
    }

    fn build_log_config(apply_filters: bool) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        if apply_filters {
            for module in FILTERED_MODULES {
                builder.add_filter_ignore_str(module);
            }
        }

        builder.build()
    }
}
