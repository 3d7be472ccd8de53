// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod clients;
pub mod config;
pub mod export;
pub mod ingest;
pub mod jobs;
pub mod model;
pub mod notify;
pub mod quote;
pub mod rank;
pub mod snapshot;
pub mod window;

// ---- Re-exports for stable public API ----
pub use crate::model::{CanonicalContentItem, ContentBucket, RssPostItem, Snapshot};
pub use crate::notify::{NotificationEvent, NotifierMux};
pub use crate::quote::{rewrite_optional, rewrite_quote_markup};
pub use crate::rank::{rank, TitleFilter};
pub use crate::window::extract_for_date;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Load `.env` (no-op when absent) and install compact tracing, `info` unless
/// `RUST_LOG` says otherwise.
pub fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}
