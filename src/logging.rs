use crate::config::AppConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Install the global JSON subscriber. `RUST_LOG` wins over the configured
/// level when set.
pub fn init_subscriber(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    let formatter = fmt::layer().json();

    let subscriber = Registry::default().with(filter).with(formatter);

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // A subscriber is already installed (e.g. by a test harness).
        tracing::debug!("global tracing subscriber already set");
    }
}
