use tracing_subscriber::EnvFilter;

/// Environment variable read before `RUST_LOG`.
pub const LOG_ENV: &str = "CHAINFORM_LOG";

/// Default directive for a given number of `-v` flags.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// `-v` wins over the environment; without it `CHAINFORM_LOG` then
/// `RUST_LOG` are consulted.
pub fn filter(verbosity: u8) -> EnvFilter {
    if verbosity == 0 {
        for var in [LOG_ENV, "RUST_LOG"] {
            if let Ok(filter) = EnvFilter::try_from_env(var) {
                return filter;
            }
        }
    }
    EnvFilter::new(default_directive(verbosity))
}

/// Installs the stderr subscriber. Safe to call more than once.
pub fn init(verbosity: u8) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(verbosity))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
