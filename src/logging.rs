//! # Structured Logging Module
//!
//! Environment-aware structured logging that outputs to both console and a
//! JSON log file, for following chunk execution across concurrent jobs.

use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);

        let log_dir = PathBuf::from("log");
        let file_logging = fs::create_dir_all(&log_dir).is_ok();

        let pid = process::id();
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let log_filename = format!("{environment}.{pid}.{timestamp}.log");

        let console_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_level(true)
            .with_ansi(true)
            .with_filter(EnvFilter::new(log_level.clone()));

        let (file_layer, guard) = if file_logging {
            let file_appender = tracing_appender::rolling::never(&log_dir, &log_filename);
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .with_writer(file_writer)
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(EnvFilter::new(log_level));
            (Some(layer), Some(guard))
        } else {
            (None, None)
        };

        let subscriber = tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer);

        // A global subscriber may already be installed (tests, embedding binaries)
        if subscriber.try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            pid = pid,
            environment = %environment,
            file_logging = file_logging,
            log_file = %log_dir.join(&log_filename).display(),
            "🔧 STRUCTURED LOGGING: Initialized"
        );

        // The writer must outlive the process
        if let Some(guard) = guard {
            std::mem::forget(guard);
        }
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("COLLECTIONS_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment, `RUST_LOG` wins when set
fn get_log_level(environment: &str) -> String {
    if let Ok(filter) = std::env::var("RUST_LOG") {
        return filter;
    }
    level_for_environment(environment).to_string()
}

fn level_for_environment(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        "test" | "development" => "debug",
        _ => "debug",
    }
}

/// Log structured data for job lifecycle operations
pub fn log_job_operation(
    operation: &str,
    job_id: &str,
    status: &str,
    chunks_processed: usize,
    chunks_total: usize,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        job_id = %job_id,
        status = %status,
        chunks_processed = chunks_processed,
        chunks_total = chunks_total,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "📋 JOB_OPERATION"
    );
}

/// Log structured data for chunk execution
pub fn log_chunk_operation(
    operation: &str,
    job_id: &str,
    collection_id: &str,
    chunk_len: usize,
    inserted: Option<usize>,
    duration_ms: Option<u64>,
) {
    tracing::info!(
        operation = %operation,
        job_id = %job_id,
        collection_id = %collection_id,
        chunk_len = chunk_len,
        inserted = inserted,
        duration_ms = duration_ms,
        timestamp = %Utc::now().to_rfc3339(),
        "🔧 CHUNK_OPERATION"
    );
}

/// Log structured data for membership cache operations
pub fn log_cache_operation(operation: &str, collection_id: Option<&str>, entries: Option<usize>) {
    tracing::debug!(
        operation = %operation,
        collection_id = collection_id,
        entries = entries,
        timestamp = %Utc::now().to_rfc3339(),
        "💾 CACHE_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "❌ ERROR"
    );
}
