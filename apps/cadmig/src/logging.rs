//! Logger capability consumed by the migration orchestrator, and the
//! `tracing` setup used by the binary.

use crate::error::LogError;
use serde_json::Value as Json;
use tracing_subscriber::EnvFilter;

/// Minimal structured logger. Errors are returned, never required to be handled.
pub trait Logger: Send + Sync {
    fn info(&self, message: &str, context: &Json) -> Result<(), LogError>;
    fn error(&self, message: &str, context: &Json) -> Result<(), LogError>;
}

/// Forwards records to `tracing` with the context rendered as JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str, context: &Json) -> Result<(), LogError> {
        tracing::info!(context = %context, "{}", message);
        Ok(())
    }

    fn error(&self, message: &str, context: &Json) -> Result<(), LogError> {
        tracing::error!(context = %context, "{}", message);
        Ok(())
    }
}

/// Drops every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn info(&self, _message: &str, _context: &Json) -> Result<(), LogError> {
        Ok(())
    }

    fn error(&self, _message: &str, _context: &Json) -> Result<(), LogError> {
        Ok(())
    }
}

/// Install a stderr subscriber. `RUST_LOG` wins over `verbose`.
pub fn init(verbose: bool) {
    let default = if verbose { "cadmig=info" } else { "cadmig=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
