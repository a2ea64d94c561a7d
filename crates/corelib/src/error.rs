//! Core shared errors (renderer-agnostic).

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("Invalid load transition: {event} while {state}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },
    #[error("Scene already has a {0}")]
    DuplicateNode(&'static str),
    #[error("Unknown scene node {0}")]
    UnknownNode(u32),
}

pub type CoreResult<T> = Result<T, CoreError>;
