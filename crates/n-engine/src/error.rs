//! Interpreter errors.
//!
//! Nothing here is fatal. The session turns every error into either silence
//! (unresolvable targets, unknown keys) or a status message, and the keystroke
//! loop carries on.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A motion or text object found nothing to act on.
    #[error("no target")]
    NoTarget,

    /// A key that no grammar rule accepts in the current state.
    #[error("invalid key sequence")]
    InvalidKey,

    #[error("E664: changelist is empty")]
    EmptyChangeList,

    #[error("E662: At start of changelist")]
    ChangeListStart,

    #[error("E663: At end of changelist")]
    ChangeListEnd,

    #[error("E35: No previous regular expression")]
    NoPreviousPattern,

    #[error("E486: Pattern not found: {0}")]
    PatternNotFound(String),

    #[error("E383: Invalid search string: {0}")]
    InvalidPattern(String),

    #[error("E20: Mark not set")]
    MarkNotSet(char),

    #[error("E354: Invalid register name: '{0}'")]
    InvalidRegister(char),

    #[error("E518: Unknown option: {0}")]
    UnknownOption(String),

    #[error("E521: Number required after =: {0}")]
    InvalidOptionValue(String),

    #[error("config: {0}")]
    Config(String),
}

impl Error {
    /// True for failures Vim reports on the status line. The rest fail
    /// silently (at most a bell).
    #[must_use]
    pub const fn is_reported(&self) -> bool {
        !matches!(self, Self::NoTarget | Self::InvalidKey)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
