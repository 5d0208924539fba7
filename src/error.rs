//! Error types for model mutation, undo step grouping and the delete command.

use thiserror::Error;

use crate::model::Position;

/// Errors raised by the document model and its mutation scope.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModelError {
    /// The position does not resolve to an offset inside an element.
    #[error("invalid position {0:?}")]
    InvalidPosition(Position),

    /// A position path was empty.
    #[error("position path must not be empty")]
    EmptyPath,

    /// The path does not address an element.
    #[error("no element at path {0:?}")]
    NotAnElement(Vec<usize>),

    /// The schema does not allow `child` inside `parent`.
    #[error("schema does not allow `{child}` inside `{parent}`")]
    SchemaViolation { child: String, parent: String },

    /// The range ends before it starts or spans different roots.
    #[error("invalid range {start:?}..{end:?}")]
    InvalidRange { start: Position, end: Position },

    /// Markup could not be parsed.
    #[error("markup error at byte {offset}: {message}")]
    Markup { offset: usize, message: String },
}

/// Contract violations of the change buffer lock discipline.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChangeBufferError {
    /// `input` was called without an open lock.
    #[error("change buffer input while unlocked")]
    NotLocked,

    /// `unlock` was called more often than `lock`.
    #[error("change buffer unlocked more often than locked")]
    Unbalanced,

    /// `flush` was requested while a lock is held.
    #[error("change buffer flushed while locked (depth {0})")]
    Locked(usize),
}

/// Errors surfaced by [`crate::DeleteCommand::execute`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DeleteError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    ChangeBuffer(#[from] ChangeBufferError),
}
