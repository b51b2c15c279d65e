pub mod config;
pub mod elements;
pub mod engine;
pub mod errors;

pub use crate::config::{load_config, load_config_from, AuditConfig};
pub use crate::elements::types::{Bounds, Element, ElementKind, StyleAttrs};
pub use crate::engine::aggregator::{audit, AuditEngine};
pub use crate::engine::checks::{CheckOutcome, CheckStatus, Frame};
pub use crate::engine::parts::{audit_parts, AuditPart, MultiPartReport, PartReport};
pub use crate::engine::report::{AuditReport, AuditSummary, MatchedPair};
pub use crate::errors::{AuditError, AuditResult};

/// Installs a `tracing` fmt subscriber filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}
