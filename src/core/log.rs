use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

const CRATE_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Only this crate logs, and only with `--verbose`. Dependencies such as
/// reqwest and hyper stay quiet unless `RUST_LOG` asks for them.
fn app_targets(verbose: bool) -> Targets {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    Targets::new().with_target(CRATE_TARGET, level)
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let default = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
        EnvFilter::default().add_directive(default.into())
    })
}

/// Installs the global subscriber. Sampling warnings (a date whose lookup
/// failed) surface even without `--verbose`.
pub fn init_logging(verbose: bool) {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_target(verbose)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(app_targets(verbose))
        .with(env_filter(verbose))
        .init();
}
