// src/logging.rs
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        "debug,aws_config=info,aws_smithy_runtime=info,hyper=info"
    } else {
        "info"
    }
}

/// Install the process-wide subscriber. Logs go to stderr so stdout stays
/// free for the invocation response.
pub fn init_tracing(debug: bool) {
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    if debug {
        tracing::debug!("debug mode enabled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filters_parse() {
        for debug in [true, false] {
            assert!(default_filter(debug).parse::<EnvFilter>().is_ok());
        }
    }
}
