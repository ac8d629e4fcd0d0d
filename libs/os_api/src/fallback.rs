use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use crate::PlatformProcessControl;

/// Platforms without dedicated support: no GPU selection, relaunch by spawning.
pub struct OS;

impl PlatformProcessControl for OS {
    fn execute_process(
        &self,
        path: &Path,
        args: &[OsString],
        envs: &[(OsString, OsString)],
    ) -> String {
        match Command::new(path).args(args).envs(envs.iter().cloned()).spawn() {
            Ok(_) => std::process::exit(0),
            Err(e) => format!("spawn {:?} failed: {}", path, e),
        }
    }
}
