use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

static INIT_LOGGER: std::sync::Once = std::sync::Once::new();

/// Install the global fmt subscriber. `RUST_LOG` adds or overrides directives.
pub fn init_logger_once() {
    INIT_LOGGER.call_once(|| {
        let env_filter = EnvFilter::builder()
            .with_default_directive(Level::INFO.into())
            .from_env_lossy()
            .add_directive(
                "hyper=warn"
                    .parse::<Directive>()
                    .unwrap_or_else(|_| Level::WARN.into()),
            );
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    });
}
