use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};
use std::env;
use std::fs;
use std::sync::Arc;

/// Variable naming an optional plain-text log file.
pub const LOG_FILE_VAR: &str = "RENDERER_LOG_FILE";

/// Initialize console logging, plus file logging when `RENDERER_LOG_FILE` is set
pub fn init_logging() {
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let enable_backtrace = env::var("RUST_BACKTRACE").unwrap_or_else(|_| "0".to_string()) == "1";
    let log_path = env::var(LOG_FILE_VAR).ok().filter(|path| !path.is_empty());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut filter = EnvFilter::new(&log_level);
        if let Ok(directive) = "thumbnail_renderer=debug".parse() {
            filter = filter.add_directive(directive);
        }
        // reqwest/hyper are noisy at debug
        if let Ok(directive) = "hyper=info".parse() {
            filter = filter.add_directive(directive);
        }
        filter
    });

    let file_layer = log_path.as_ref().and_then(|path| {
        match fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(
                fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_span_events(FmtSpan::CLOSE)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_ansi(false), // No ANSI codes in file
            ),
            Err(e) => {
                eprintln!("Warning: Failed to open log file {}: {}", path, e);
                None
            }
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_thread_ids(true)
            .with_ansi(true)
        )
        .with(file_layer)
        .init();

    std::panic::set_hook(Box::new(move |panic_info| {
        tracing::error!("Panic occurred: {}", panic_info);

        if let Some(location) = panic_info.location() {
            tracing::error!(
                "Panic location: {}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            );
        }

        if enable_backtrace {
            tracing::error!("Backtrace:\n{:?}", std::backtrace::Backtrace::capture());
        }
    }));

    tracing::info!("Logging initialized with level: {}", log_level);
    if let Some(path) = &log_path {
        tracing::info!("File logging enabled: {}", path);
    }
}

/// Log the effective service configuration, minus secrets
pub fn log_settings(settings: &crate::config::ServerSettings) {
    tracing::info!("=== Renderer Settings ===");
    tracing::info!("Bind address: {}", settings.server_address);
    tracing::info!("API URL: {}", settings.api_url);
    tracing::info!("CDN URL: {}", settings.cdn_url);
    tracing::info!("Output root: {}", settings.cdn_directory.display());
    tracing::info!("Asset lookup timeout: {:?}", settings.asset_timeout());
    tracing::info!("Access key required: {}", settings.access_key().is_some());
    tracing::info!("=========================");
}
