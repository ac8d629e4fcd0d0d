use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use crate::app::{AppError, Application};
use crate::error_report::MessageFlags;
use crate::threading::{self, ThreadError};

/// Runs the command line given after the launcher's own name.
///
/// `engine-bootstrap ./spring --window script.txt` starts `./spring` with the
/// remaining arguments and exits with its status.
pub struct CommandApp {
    program: PathBuf,
    args: Vec<OsString>,
}

impl CommandApp {
    fn describe_signal(status: &ExitStatus) -> Option<String> {
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            status
                .signal()
                .map(|sig| format!("terminated by signal {sig}"))
        }
        #[cfg(not(unix))]
        {
            let _ = status;
            None
        }
    }

    fn spawn_error(&self, e: io::Error) -> AppError {
        match e.kind() {
            io::ErrorKind::NotFound => {
                AppError::ContentLoad(format!("missing executable {}", self.program.display()))
            }
            _ => AppError::Unexpected(format!("failed to start {}: {e}", self.program.display())),
        }
    }
}

impl Application for CommandApp {
    fn construct(args: &[OsString]) -> Result<Self, AppError> {
        let (program, rest) = args
            .get(1..)
            .and_then(<[OsString]>::split_first)
            .ok_or_else(|| AppError::Config("no program to run was given".to_string()))?;
        Ok(Self {
            program: PathBuf::from(program),
            args: rest.to_vec(),
        })
    }

    /// The GPU preference belongs to the wrapped engine, resolved through
    /// `PATH` the same way `Command` will find it.
    fn gpu_executable(args: &[OsString]) -> Option<PathBuf> {
        args.get(1)
            .map(|program| which::which(program).unwrap_or_else(|_| PathBuf::from(program)))
    }

    fn run(&mut self) -> Result<i32, AppError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;
        tracing::info!(
            pid = child.id(),
            program = %self.program.display(),
            cores = threading::core_count(),
            "started"
        );

        let label = self.program.display().to_string();
        let watcher = threading::spawn_worker("child-watch", move || -> io::Result<ExitStatus> {
            let status = child.wait()?;
            if let Some(reason) = Self::describe_signal(&status) {
                threading::set_thread_error(ThreadError::new(
                    format!("{label} {reason}"),
                    "Process crashed",
                    MessageFlags::FATAL | MessageFlags::CRASH,
                ));
            }
            Ok(status)
        })
        .map_err(|e| AppError::Unexpected(format!("failed to start watcher thread: {e}")))?;

        let status = watcher
            .join()
            .map_err(|_| AppError::Unexpected("watcher thread panicked".to_string()))?
            .map_err(|e| AppError::Unexpected(format!("failed to wait for {}: {e}", self.program.display())))?;

        Ok(status.code().unwrap_or(1))
    }
}
