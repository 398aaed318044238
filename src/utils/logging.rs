use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. `RUST_LOG` still wins over the
/// defaults set here.
pub fn init_logging(verbose: bool) {
    let env_filter = EnvFilter::from_default_env()
        .add_directive(Level::INFO.into())
        .add_directive(
            if verbose { "atomstrom=debug" } else { "atomstrom=info" }
                .parse()
                .expect("static log directive is valid"),
        );

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().pretty());

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set up tracing subscriber");
}
