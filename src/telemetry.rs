//! Logging setup.
//!
//! Log records go to stderr so stdout only carries reports. The filter comes
//! from `RUST_LOG` and defaults to `info`.

use tracing::Subscriber;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt};

use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum BuildSubscriberError {
    #[error("failed to parse filtering directive")]
    Parse(#[from] tracing_subscriber::filter::ParseError),
}

/// Build the stderr subscriber.
pub fn build_subscriber() -> Result<impl Subscriber + Send + Sync, BuildSubscriberError> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    Ok(tracing_subscriber::registry().with(fmt_layer.with_filter(env_filter)))
}

/// Install the subscriber as the global default.
pub fn init() -> Result<(), AppError> {
    let subscriber = build_subscriber().map_err(|e| AppError::new(2, format!("Invalid RUST_LOG: {e}")))?;
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AppError::new(2, format!("Failed to install logger: {e}")))
}
