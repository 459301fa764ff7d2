#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

use std::sync::LazyLock;

use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::time::Uptime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Variable holding a [`Targets`] filter for test output.
pub const LOG_ENV: &str = "REPLICA_LOG";

/// The workspace's crates log every phase of a copy; anything else only
/// its warnings.
fn default_targets() -> Targets {
    Targets::new()
        .with_default(Level::WARN)
        .with_target("replica", Level::TRACE)
        .with_target("replica_core", Level::TRACE)
        .with_target("replica_demo", Level::TRACE)
}

fn targets() -> Targets {
    match std::env::var(LOG_ENV) {
        Ok(spec) => spec.parse().unwrap_or_else(|err| {
            eprintln!("ignoring {LOG_ENV}={spec:?}: {err}");
            default_targets()
        }),
        Err(_) => default_targets(),
    }
}

static SUBSCRIBER: LazyLock<()> = LazyLock::new(|| {
    let layer = tracing_subscriber::fmt::layer()
        .with_timer(Uptime::default())
        .with_target(true)
        .with_line_number(true)
        .with_test_writer()
        .compact();
    // Another harness may have installed a subscriber already.
    let _ = tracing_subscriber::registry()
        .with(layer)
        .with(targets())
        .try_init();
});

/// Sets up a tracing subscriber for tests, once per process.
///
/// The workspace's crates log at `TRACE`, everything else at `WARN`, unless
/// [`LOG_ENV`] holds a [`Targets`] filter such as `replica=debug`.
pub fn setup() {
    LazyLock::force(&SUBSCRIBER);
}

/// A test error that panics as soon as it is built, so `?` fails the test at
/// the line that produced the error, with the error's causes listed.
#[derive(Debug)]
pub struct IPanic;

impl<E> From<E> for IPanic
where
    E: core::error::Error + Send + Sync,
{
    #[track_caller]
    fn from(err: E) -> Self {
        let mut message = format!("{}: {err}", core::panic::Location::caller());
        let mut cause = err.source();
        while let Some(inner) = cause {
            message.push_str(&format!("\n  caused by: {inner}"));
            cause = inner.source();
        }
        panic!("{message}")
    }
}
