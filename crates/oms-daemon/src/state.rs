//! Shared runtime state for oms-daemon.
//!
//! Handlers receive `State<Arc<AppState>>` from Axum. The Postgres pool is
//! injected here at boot and passed explicitly into every data-access call —
//! there is no process-global store handle.

use sqlx::PgPool;

/// Static build metadata included in health responses.
#[derive(Clone, Debug)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

/// Cloneable (Arc) handle shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Connection pool; the database is the sole shared mutable resource.
    pub pool: PgPool,
    /// Static build metadata.
    pub build: BuildInfo,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            build: BuildInfo {
                service: "oms-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
        }
    }
}
