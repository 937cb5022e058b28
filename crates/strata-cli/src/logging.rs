//! Diagnostic logging setup
//!
//! The subscriber is installed before the configuration is read so that
//! store loading can be traced. It starts from `STRATA_LOG` (or `info`) and
//! switches to the configured `log_level` once the store is loaded, unless
//! `STRATA_LOG` is set.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

/// Environment variable that overrides the configured log filter
pub const LOG_ENV: &str = "STRATA_LOG";

/// Filter used when neither `STRATA_LOG` nor `log_level` is usable
pub const DEFAULT_LEVEL: &str = "info";

/// Handle for adjusting the installed filter after startup
pub struct LogHandle {
    filter: Option<reload::Handle<EnvFilter, Registry>>,
    from_env: bool,
}

impl LogHandle {
    /// Switch to the configured `log_level`. No-op when `STRATA_LOG` is set.
    pub fn apply_configured(&self, level: &str) {
        let Some(handle) = &self.filter else {
            return;
        };
        if self.from_env {
            return;
        }

        let directive = directive(None, level);
        if let Err(e) = handle.reload(EnvFilter::new(&directive)) {
            tracing::warn!(error = %e, "failed to apply configured log level");
            return;
        }
        tracing::debug!(level = %directive, "log level applied");
    }
}

/// Install the global subscriber, writing to stderr so command output on
/// stdout stays clean.
pub fn init() -> LogHandle {
    let env = std::env::var(LOG_ENV).ok();
    let from_env = env.as_deref().is_some_and(valid_env_directive);
    let (filter, handle) =
        reload::Layer::new(EnvFilter::new(directive(env.as_deref(), DEFAULT_LEVEL)));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(std::env::var_os("NO_COLOR").is_none())
                .without_time(),
        )
        .try_init()
        .is_ok();

    LogHandle {
        filter: installed.then_some(handle),
        from_env,
    }
}

/// Filter directive to use: a valid `STRATA_LOG` value wins, then the
/// configured level name, then `info`.
pub fn directive(env: Option<&str>, configured: &str) -> String {
    if let Some(env) = env.map(str::trim).filter(|d| valid_env_directive(d)) {
        return env.to_string();
    }

    let configured = configured.trim();
    if configured.parse::<LevelFilter>().is_ok() {
        configured.to_lowercase()
    } else {
        DEFAULT_LEVEL.to_string()
    }
}

fn valid_env_directive(directive: &str) -> bool {
    let directive = directive.trim();
    !directive.is_empty() && EnvFilter::try_new(directive).is_ok()
}
