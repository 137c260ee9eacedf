//! User-facing wording for coordinator failures.

use client_core::CoordinatorError;

use crate::render;

pub fn describe_failure(err: &CoordinatorError) -> String {
    match err {
        CoordinatorError::Validation(errors) => {
            format!("wine not saved:\n{}", render::validation_errors(errors))
        }
        CoordinatorError::UnresolvedValidation => err.to_string(),
        CoordinatorError::Transport { operation, source } => {
            let detail = format!("{source:#}");
            if is_unreachable(&detail) {
                format!("error {operation}: server unreachable; check the api url and retry")
            } else {
                format!("error {operation}: {detail}")
            }
        }
    }
}

fn is_unreachable(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("failed to connect")
        || lower.contains("connection refused")
        || lower.contains("error sending request")
        || lower.contains("dns")
        || lower.contains("timed out")
}
