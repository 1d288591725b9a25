use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "lumen_engine=debug"). When absent, `RUST_LOG` is consulted, then
/// `default_level`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    pub default_level: log::LevelFilter,
    /// Caps wgpu/naga internals at `warn` regardless of the other filters.
    pub quiet_gpu: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            default_level: log::LevelFilter::Info,
            quiet_gpu: true,
        }
    }
}

const GPU_NOISE_FILTER: &str = "wgpu_core=warn,wgpu_hal=warn,naga=warn";

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// This function is idempotent; subsequent calls are ignored.
/// Intended usage is early in `main`, before the GPU device is created.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(config.default_level);

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        }

        if config.quiet_gpu {
            builder.parse_filters(GPU_NOISE_FILTER);
        }

        builder.write_style(config.write_style);
        builder.format_timestamp_millis();

        // Another logger may already be installed by the host; keep it.
        if builder.try_init().is_err() {
            log::debug!("logger already installed; lumen logging config ignored");
            return;
        }

        log::debug!("logging initialized");
    });
}
