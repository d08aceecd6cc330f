//! Test framework for the kestrel tree crates
//!
//! Runs in userspace and can use std. Provides an owning pool of tree
//! elements so scenarios never juggle raw pointers, plus the log bootstrap.

pub mod helpers;

pub use helpers::EntryPool;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install a `fmt` subscriber filtered by `KESTREL_LOG` (default `warn`)
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("KESTREL_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice() {
        init_tracing();
        init_tracing();
        tracing::warn!("still logging");
    }
}
