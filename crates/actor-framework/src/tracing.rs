//! # Observability
//!
//! Actor loops log every request with an `entity_type` field (`Order`, `Drone`, ...),
//! and clients open spans through `#[tracing::instrument]`, so a single order can be
//! followed from the HTTP handler through the order actor to the relay:
//!
//! ```text
//! INFO create_order: Created entity_type="Order" id=order_3 size=3
//! INFO create_order: Relay emit event="new_order" room=Some("branch_q1") recipients=2
//! ```
//!
//! `RUST_LOG=debug` adds the full request payloads.

/// Installs the global subscriber, filtered by `RUST_LOG`.
///
/// Compact format without module targets; `entity_type` already says which store
/// a line belongs to.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
