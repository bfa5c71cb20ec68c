use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    /// Recoverable input problem (missing file/month, nothing eligible).
    #[error("{0}")]
    Validation(String),

    /// An edit referenced a hash absent from the current preview batch.
    #[error("row not in current preview: {0}")]
    UnknownRow(String),

    /// Group edits are rejected for rows whose effective category is income.
    #[error("group is not applicable: '{0}' is an income category")]
    GroupNotApplicable(String),

    /// A preview or commit is already in flight for this session.
    #[error("a preview or commit is already in flight")]
    Busy,

    /// A response arrived after the session was reset or superseded.
    /// Callers discard this silently; it is never shown to the user.
    #[error("stale response discarded")]
    StaleResponse,

    /// Preview/commit request failed in transit. Session state is kept so
    /// the user can retry without re-entering edits.
    #[error("transport: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, ImportError>;
