//! Error types for the engine boundary and scene reconciliation.

use thiserror::Error;

use crate::geom::Point;

/// A failure reported by (or about) the external puzzle engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The engine could not be constructed.
    #[error("engine initialization failed: {0}")]
    Init(String),
    /// The completion handle was dropped without delivering an engine.
    #[error("engine initialization was abandoned")]
    Abandoned,
    /// A state query failed.
    #[error("engine query `{query}` failed: {reason}")]
    Query { query: &'static str, reason: String },
    /// Advancing the engine by one step failed.
    #[error("engine step failed: {0}")]
    Step(String),
}

/// A raw color value that does not name a palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("color id {0} is outside the palette")]
    OutOfPalette(i32),
}

/// Reconciliation aborted before any cell was touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("color query at {at} failed")]
    Color {
        at: Point,
        #[source]
        source: EngineError,
    },
    #[error("active piece offset query failed")]
    Offset(#[source] EngineError),
}
