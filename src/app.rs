use std::ffi::OsString;
use std::path::PathBuf;

use thiserror::Error;

/// Failures an [`Application`] knows how to describe.
///
/// Anything outside this set (a panic) is still caught by the bootstrap, but
/// reported with a generic caption.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("{0}")]
    Config(String),
    #[error("{0}")]
    ContentLoad(String),
    #[error("{0}")]
    Graphics(String),
    #[error("{0}")]
    User(String),
    #[error("{0}")]
    OutOfMemory(String),
    #[error("{0}")]
    Unexpected(String),
}

impl AppError {
    /// Message box caption for this kind of failure.
    pub fn caption(&self) -> &'static str {
        match self {
            AppError::Config(_) => "Configuration error:",
            AppError::ContentLoad(_) => "Incorrect/Missing content:",
            AppError::Graphics(_) => "Graphics error:",
            AppError::User(_) => "Fatal error",
            AppError::OutOfMemory(_) => "Fatal error (out of memory)",
            AppError::Unexpected(_) => "Fatal error (general exception)",
        }
    }
}

/// The application hosted by the bootstrap.
///
/// `construct` and `run` both happen on the main thread, after the thread
/// registry is populated.
pub trait Application: Sized {
    /// Builds the application from the full argument list, program name included.
    fn construct(args: &[OsString]) -> Result<Self, AppError>;

    /// Runs to completion and returns the process exit code.
    fn run(&mut self) -> Result<i32, AppError>;

    /// The executable that creates the GPU device, when that is a program
    /// started by the application rather than this process.
    ///
    /// Consulted before `construct`, so it only sees the raw arguments.
    fn gpu_executable(_args: &[OsString]) -> Option<PathBuf> {
        None
    }
}
