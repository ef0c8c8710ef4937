use charla_common::StateName;
use charla_parser::TagError;
use thiserror::Error;

/// Errors that can occur while playing a dialog. None of them leaves the
/// session in an inconsistent state.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("ERROR: Dialog not found: {name}")]
    DialogNotFound { name: String },
    #[error("ERROR: State not found: {name}")]
    StateNotFound { name: StateName },
    #[error("ERROR: Malformed tag in state `{state}`: {source}")]
    MalformedTag {
        state: StateName,
        #[source]
        source: TagError,
    },
    #[error("ERROR: Cannot advance: {0}")]
    InvalidAdvance(#[from] AdvanceError),
    #[error("ERROR: State `{state}` has {responses} responses but only {slots} response slots")]
    ConfigurationMismatch {
        state: StateName,
        responses: usize,
        slots: usize,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdvanceError {
    #[error("the dialog is paused")]
    Paused,
    #[error("no dialog state is playing")]
    NotPlaying,
    #[error("response {} does not exist ({available} available)", .index + 1)]
    ResponseOutOfRange { index: usize, available: usize },
    #[error("response {} has no jump", .index + 1)]
    ResponseWithoutJump { index: usize },
    #[error("the current state requires a response")]
    ResponseRequired,
}
