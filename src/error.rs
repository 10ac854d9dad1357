//! Binary-boundary error type.
//!
//! Recoverable conditions (no rows for a date, not enough forecast history)
//! are modeled in their own modules and surfaced as plain text; `AppError` is
//! reserved for failures that should terminate the current command with a
//! non-zero exit.

/// Exit code for usage/input problems (bad flags, missing files).
pub const EXIT_USAGE: u8 = 2;
/// Exit code for runtime failures (database, terminal, export I/O).
pub const EXIT_RUNTIME: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// A usage/input error (exit code 2).
    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, message)
    }

    /// A runtime error (exit code 4).
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(EXIT_RUNTIME, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<crate::data::DataError> for AppError {
    fn from(err: crate::data::DataError) -> Self {
        AppError::runtime(err.to_string())
    }
}
