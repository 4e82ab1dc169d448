//! Closed status taxonomy used as the sole failure channel across the crate.

use thiserror::Error;

/// Every outcome a core operation can report, closed over the set the
/// original console middleware defined. New variants must not be added
/// without updating every `match` that is exhaustive over this type.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    #[error("success")]
    Ok,
    #[error("generic error")]
    Generic,
    #[error("invalid parameter")]
    InvalidParam,
    #[error("not initialized")]
    NotInit,
    #[error("already initialized")]
    AlreadyInit,
    #[error("memory allocation failed")]
    NoMemory,
    #[error("item not found")]
    NotFound,
    #[error("item already exists")]
    AlreadyExists,
    #[error("no backend configured")]
    NoBackend,
    #[error("buffer is full")]
    BufferFull,
}

impl Status {
    /// Stable, human-readable message for this status. Pure and total —
    /// every variant has a message, there is no "unknown error" fallback.
    pub fn message(self) -> &'static str {
        match self {
            Status::Ok => "Success",
            Status::Generic => "Generic error",
            Status::InvalidParam => "Invalid parameter",
            Status::NotInit => "Shell not initialized",
            Status::AlreadyInit => "Shell already initialized",
            Status::NoMemory => "Memory allocation failed",
            Status::NotFound => "Item not found",
            Status::AlreadyExists => "Item already exists",
            Status::NoBackend => "No backend configured",
            Status::BufferFull => "Buffer is full",
        }
    }
}

/// A thin, context-carrying error shown to the operator, layered over
/// [`Status`] the way an application layer formats a lower-level result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", format_shell_error(.status, .context))]
pub struct ShellError {
    pub status: Status,
    pub context: Option<String>,
}

fn format_shell_error(status: &Status, context: &Option<String>) -> String {
    match context {
        Some(ctx) if !ctx.is_empty() => {
            format!("Error: {} - {} (code {})", status.message(), ctx, *status as i32)
        }
        _ => format!("Error: {} (code {})", status.message(), *status as i32),
    }
}

impl ShellError {
    pub fn new(status: Status) -> Self {
        Self { status, context: None }
    }

    pub fn with_context(status: Status, context: impl Into<String>) -> Self {
        Self { status, context: Some(context.into()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_stable_and_total() {
        let all = [
            Status::Ok,
            Status::Generic,
            Status::InvalidParam,
            Status::NotInit,
            Status::AlreadyInit,
            Status::NoMemory,
            Status::NotFound,
            Status::AlreadyExists,
            Status::NoBackend,
            Status::BufferFull,
        ];
        for status in all {
            assert!(!status.message().is_empty());
        }
    }

    #[test]
    fn shell_error_formats_with_code() {
        let err = ShellError::new(Status::NotFound);
        assert_eq!(format!("{err}"), "Error: Item not found (code 6)");
    }

    #[test]
    fn shell_error_formats_with_context() {
        let err = ShellError::with_context(Status::InvalidParam, "bad prompt length");
        assert_eq!(
            format!("{err}"),
            "Error: Invalid parameter - bad prompt length (code 2)"
        );
    }
}
