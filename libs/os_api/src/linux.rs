use std::ffi::OsString;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::Command;

use nix::sched::{CpuSet, sched_getaffinity};
use nix::unistd::Pid;

use crate::PlatformProcessControl;

pub struct OS;

impl OS {
    fn count_cpuset(set: &CpuSet) -> usize {
        (0..CpuSet::count())
            .filter(|&i| set.is_set(i).unwrap_or(false))
            .count()
    }
}

impl PlatformProcessControl for OS {
    /// Counts the CPUs in the calling process's affinity mask, which respects
    /// `taskset` and cgroup cpusets unlike the raw processor count.
    fn available_cores(&self) -> Option<usize> {
        let set = sched_getaffinity(Pid::from_raw(0)).ok()?;
        match Self::count_cpuset(&set) {
            0 => None,
            n => Some(n),
        }
    }

    // No persistent per-executable GPU selection exists here; PRIME offload is
    // per-launch environment and is left to the user.

    fn execute_process(
        &self,
        path: &Path,
        args: &[OsString],
        envs: &[(OsString, OsString)],
    ) -> String {
        // exec only comes back on error
        let err = Command::new(path).args(args).envs(envs.iter().cloned()).exec();
        format!("execv {:?} failed: {}", path, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affinity_mask_reports_at_least_one_core() {
        let cores = OS.available_cores();
        assert!(cores.is_none_or(|n| n >= 1));
    }

    #[test]
    fn exec_of_missing_binary_returns_error_text() {
        let msg = OS.execute_process(Path::new("/definitely/not/here/engine"), &[], &[]);
        assert!(msg.contains("/definitely/not/here/engine"), "{msg}");
    }

    #[test]
    fn gpu_preference_is_unsupported() {
        assert!(!OS.supports_gpu_preference());
        assert_eq!(OS.gpu_preference(Path::new("/usr/bin/true")), Ok(None));
    }
}
