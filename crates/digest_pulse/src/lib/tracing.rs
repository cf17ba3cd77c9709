use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const APP_NAME: &str = "digest-pulse";

/// Installs the global subscriber: bunyan JSON lines on stdout, or a
/// human readable layout when `pretty` is set. Events are also forwarded to
/// sentry. `RUST_LOG` overrides the default `info` level.
pub fn init_tracing_subscriber(pretty: bool) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let bunyan = (!pretty)
        .then(|| BunyanFormattingLayer::new(APP_NAME.to_string(), std::io::stdout));
    let fmt = pretty.then(|| tracing_subscriber::fmt::layer().pretty().with_target(false));

    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(bunyan)
        .with(fmt)
        .with(sentry_tracing::layer())
        .try_init()?;

    Ok(())
}
