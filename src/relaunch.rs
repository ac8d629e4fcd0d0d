use std::ffi::OsString;
use std::path::PathBuf;

use os_api::PlatformProcessControl;

use crate::gpu_profile::RESTARTED_ENV;

/// A relaunch of the current program with its original arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestartRequest {
    pub executable: PathBuf,
    pub arguments: Vec<OsString>,
}

impl RestartRequest {
    /// `args[0]` becomes the executable, the rest are passed through unchanged.
    pub fn from_args(args: &[OsString]) -> Option<Self> {
        let (program, rest) = args.split_first()?;
        Some(Self {
            executable: PathBuf::from(program),
            arguments: rest.to_vec(),
        })
    }

    /// Variables the new image gets on top of the inherited environment.
    ///
    /// Passed to the child directly; this process's environment is not
    /// touched, since worker threads may still be reading it.
    pub fn environment() -> Vec<(OsString, OsString)> {
        vec![(RESTARTED_ENV.into(), "1".into())]
    }

    /// Replaces this process with the relaunch.
    ///
    /// Returning at all means the relaunch failed; the string says why.
    pub fn execute<P>(self, platform: &P) -> String
    where
        P: PlatformProcessControl + ?Sized,
    {
        tracing::info!(
            exe = %self.executable.display(),
            args = ?self.arguments,
            "relaunching"
        );
        platform.execute_process(&self.executable, &self.arguments, &Self::environment())
    }
}
