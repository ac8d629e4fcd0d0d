use std::ffi::OsString;
use std::panic::{self, AssertUnwindSafe};

use crate::app::{AppError, Application};
use crate::error_report::{FatalReport, MessageFlags};
use crate::threading::panic_payload_text;

/// Exit status when the application failed before producing one.
pub const BOOTSTRAP_FAILED: i32 = -1;

/// Result of one construct-and-run pass.
#[derive(Debug, PartialEq, Eq)]
pub struct RunOutcome {
    pub status: i32,
    /// Present when construct or run failed; the status is then [`BOOTSTRAP_FAILED`].
    pub failure: Option<FatalReport>,
}

impl RunOutcome {
    fn completed(status: i32) -> Self {
        Self {
            status,
            failure: None,
        }
    }

    fn failed(report: FatalReport) -> Self {
        Self {
            status: BOOTSTRAP_FAILED,
            failure: Some(report),
        }
    }
}

fn recognized(error: AppError) -> FatalReport {
    FatalReport::new(error.to_string(), error.caption(), MessageFlags::FATAL)
}

fn unrecognized(message: String) -> FatalReport {
    FatalReport::new(
        message,
        "Fatal error (unknown exception)",
        MessageFlags::FATAL | MessageFlags::CRASH,
    )
}

/// Constructs `A` and runs it, turning every failure into a [`FatalReport`].
///
/// Panics are caught as well, so nothing escapes this call.
pub fn run_application<A: Application>(args: &[OsString]) -> RunOutcome {
    let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut app = A::construct(args)?;
        app.run()
    }));

    match attempt {
        Ok(Ok(status)) => {
            tracing::info!(status, "application returned");
            RunOutcome::completed(status)
        }
        Ok(Err(error)) => {
            tracing::error!(caption = error.caption(), "application failed: {error}");
            RunOutcome::failed(recognized(error))
        }
        Err(payload) => {
            let message = panic_payload_text(payload.as_ref());
            tracing::error!("application panicked: {message}");
            RunOutcome::failed(unrecognized(message))
        }
    }
}
