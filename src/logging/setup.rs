// SPDX-License-Identifier: GPL-3.0-only
use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing subscriber with configuration.
///
/// `RUST_LOG` takes precedence over `log_level`. With `json` set, events are
/// written as one JSON object per line for log shippers.
pub fn setup_logging(log_level: &str, json: bool) -> anyhow::Result<()> {
    let filter = build_filter(EnvFilter::try_from_default_env().ok(), log_level);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true)
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
            )
            .try_init()?;
    }

    Ok(())
}

fn build_filter(from_env: Option<EnvFilter>, log_level: &str) -> EnvFilter {
    from_env
        .or_else(|| EnvFilter::try_new(log_level).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
