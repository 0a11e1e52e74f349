use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `gallerist`.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide recovery strategy; internal code continues to use
/// `anyhow::Result` for ad-hoc context chains.
///
/// Note what is absent: there is no variant for malformed oracle output. The
/// oracle is a natural-language model with no schema enforcement, so text that
/// parses to nothing is routine and surfaces as empty collections, never as an
/// error.
#[derive(Debug, Error)]
pub enum GalleristError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Oracle / completion backend ──────────────────────────────────────
    #[error("oracle: {0}")]
    Oracle(#[from] OracleError),

    // ── History persistence ──────────────────────────────────────────────
    #[error("history: {0}")]
    History(#[from] HistoryError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Oracle errors ──────────────────────────────────────────────────────────

/// Transport-level oracle failures. These are fatal to the calling operation
/// and must propagate; they are never folded into "zero results".
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("provider {provider} unavailable: {message}")]
    Unavailable { provider: String, message: String },

    #[error("provider {provider} API key not set")]
    MissingApiKey { provider: String },
}

// ─── History errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("encode failed for key {key}: {message}")]
    Encode { key: String, message: String },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, GalleristError>;
