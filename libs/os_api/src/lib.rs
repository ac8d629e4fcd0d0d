mod gpu;
pub use gpu::GpuPreference;

use std::ffi::OsString;
use std::path::Path;

#[cfg(target_os = "windows")]
mod windows;
#[cfg(target_os = "linux")]
mod linux;
#[cfg(not(any(target_os = "windows", target_os = "linux")))]
mod fallback;

// One implementation per platform behind a common name
#[cfg(target_os = "windows")]
pub use windows::OS;
#[cfg(target_os = "linux")]
pub use linux::OS;
#[cfg(not(any(target_os = "windows", target_os = "linux")))]
pub use fallback::OS;

/// Process-level capabilities the bootstrap needs from the host OS.
///
/// Every method has a conservative default so a platform only overrides what
/// it can actually do.
pub trait PlatformProcessControl {
    /// Number of logical processors the current process may run on.
    fn available_cores(&self) -> Option<usize> {
        None
    }

    /// Whether the OS keeps a persistent per-executable GPU selection.
    fn supports_gpu_preference(&self) -> bool {
        false
    }

    /// Reads the stored GPU selection for `exe`, `None` when nothing is stored.
    fn gpu_preference(&self, _exe: &Path) -> Result<Option<GpuPreference>, String> {
        Ok(None)
    }

    fn set_gpu_preference(&self, exe: &Path, _preference: GpuPreference) -> Result<(), String> {
        Err(format!(
            "GPU preference is not supported on this platform ({})",
            exe.display()
        ))
    }

    /// Replaces the current process with `path args...`, adding `envs` to the
    /// inherited environment of the new image.
    ///
    /// Only returns on failure, so the returned string always describes an error.
    fn execute_process(
        &self,
        path: &Path,
        args: &[OsString],
        envs: &[(OsString, OsString)],
    ) -> String;
}
