use nova_framework_faulttolerance::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Effective filter: the configured level with `RUST_LOG` merged on top.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    let config_directives = config.directives();
    let config_filter = || {
        EnvFilter::try_new(&config_directives).unwrap_or_else(|_| {
            EnvFilter::default().add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        })
    };

    let env_directives = std::env::var("RUST_LOG")
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty());

    match env_directives {
        Some(env_directives) => {
            EnvFilter::try_new(format!("{config_directives},{env_directives}"))
                .or_else(|_| EnvFilter::try_new(&env_directives))
                .unwrap_or_else(|_| config_filter())
        }
        None => config_filter(),
    }
}

/// Install the global subscriber. Logs always go to stderr so stdout stays
/// machine readable.
pub fn init(config: &LoggingConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(std::io::stderr)
        .with_ansi(false);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if installed.is_err() {
        tracing::debug!(target = "nova.microprofile", "tracing subscriber already installed");
    }
}
