//! Logging initialisation.
//!
//! docbase emits `tracing` events at operation boundaries. Applications that do not
//! install their own subscriber can call [`init`] once at startup. The filter is
//! read from `RUST_LOG` when set.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, util::SubscriberInitExt};

/// Output profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output at debug level
    Development,
    /// JSON lines at info level
    Production,
    /// No output; lets tests run with an empty subscriber
    Test,
}

impl Profile {
    fn default_filter(&self) -> &'static str {
        match self {
            Profile::Development => "docbase=debug,docbase_core=debug,docbase_memory=debug",
            Profile::Production | Profile::Test => "docbase=info,docbase_core=info,docbase_memory=info",
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Installs the global subscriber for `profile`.
///
/// Only the first call has any effect. If another global subscriber is already
/// installed the call is a no-op.
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(profile.default_filter()));

        let _ = match profile {
            Profile::Development => tracing_subscriber::fmt().with_env_filter(filter).finish().try_init(),
            Profile::Production => tracing_subscriber::fmt().json().with_env_filter(filter).finish().try_init(),
            Profile::Test => tracing_subscriber::registry().try_init(),
        };
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init(Profile::Test);
        init(Profile::Test);
        init(Profile::Development);
    }

    #[test]
    fn profiles_pick_levels() {
        assert!(Profile::Development.default_filter().contains("debug"));
        assert!(!Profile::Production.default_filter().contains("debug"));
    }
}
