use std::fmt;

use thiserror::Error;

use crate::validation::ValidationErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Fetch,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Fetch => "fetching wines",
            Operation::Create => "creating wine",
            Operation::Update => "updating wines",
            Operation::Delete => "deleting wine",
        })
    }
}

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("invalid wine: {0}")]
    Validation(ValidationErrors),
    #[error("fix errors before submitting")]
    UnresolvedValidation,
    #[error("error {operation}")]
    Transport {
        operation: Operation,
        source: anyhow::Error,
    },
}

impl CoordinatorError {
    pub(crate) fn transport(operation: Operation, source: anyhow::Error) -> Self {
        Self::Transport { operation, source }
    }

    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            CoordinatorError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, CoordinatorError::Transport { .. })
    }
}
