use std::sync::Once;

/// Crates that are noisy at `info` and only log warnings by default.
const QUIET_CRATES: [&str; 3] = ["wgpu_core", "wgpu_hal", "naga"];

/// Logger setup; the filter uses `env_logger` syntax such as
/// `"info,halton_demo=debug"`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Overrides `RUST_LOG` when set.
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { env_filter: None, write_style: env_logger::WriteStyle::Auto }
    }
}

static INIT: Once = Once::new();

/// Installs `env_logger` behind the `log` facade. Only the first call has an effect.
///
/// The filter is `config.env_filter`, else `RUST_LOG`, else `info` with the
/// wgpu internals held at `warn`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        match config.env_filter.or_else(|| std::env::var("RUST_LOG").ok()) {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                builder.filter_level(log::LevelFilter::Info);
                for name in QUIET_CRATES {
                    builder.filter_module(name, log::LevelFilter::Warn);
                }
            }
        }
        builder.write_style(config.write_style);
        builder.format_timestamp_millis();
        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}
