use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use windows::Win32::System::Threading::{GetCurrentProcess, GetProcessAffinityMask};
use winreg::RegKey;
use winreg::enums::*;

use crate::{GpuPreference, PlatformProcessControl};

const GPU_PREFERENCES_KEY: &str = r"Software\Microsoft\DirectX\UserGpuPreferences";
const GPU_PREFERENCE_FIELD: &str = "GpuPreference";

// ---- internal error type (public API still returns String) ----
#[derive(Debug)]
enum OsError {
    Win(windows::core::Error),
    Io(io::Error),
}

impl std::fmt::Display for OsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OsError::Win(e) => write!(f, "{e}"),
            OsError::Io(e) => write!(f, "{e}"),
        }
    }
}

impl From<windows::core::Error> for OsError {
    fn from(e: windows::core::Error) -> Self {
        Self::Win(e)
    }
}

impl From<io::Error> for OsError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

pub struct OS;

impl OS {
    // The value is a `;`-separated list like "SwapEffectUpgradeEnable=1;GpuPreference=2;"
    fn parse_gpu_preference(data: &str) -> Option<GpuPreference> {
        data.split(';')
            .filter_map(|entry| entry.split_once('='))
            .find(|(key, _)| key.trim() == GPU_PREFERENCE_FIELD)
            .and_then(|(_, value)| value.trim().parse::<u32>().ok())
            .and_then(GpuPreference::from_index)
    }

    // Rewrites only the GpuPreference entry and keeps whatever else Windows stored.
    fn merge_gpu_preference(existing: &str, preference: GpuPreference) -> String {
        let mut out: String = existing
            .split(';')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .filter(|entry| {
                entry
                    .split_once('=')
                    .map(|(key, _)| key.trim() != GPU_PREFERENCE_FIELD)
                    .unwrap_or(true)
            })
            .map(|entry| format!("{entry};"))
            .collect();
        out.push_str(&format!("{}={};", GPU_PREFERENCE_FIELD, preference.index()));
        out
    }

    fn read_preference_value(exe: &Path) -> Result<Option<String>, OsError> {
        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        let key = match hkcu.open_subkey(GPU_PREFERENCES_KEY) {
            Ok(key) => key,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match key.get_value::<String, _>(exe.as_os_str()) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl PlatformProcessControl for OS {
    fn available_cores(&self) -> Option<usize> {
        let mut process_mask = 0usize;
        let mut system_mask = 0usize;
        unsafe {
            GetProcessAffinityMask(GetCurrentProcess(), &mut process_mask, &mut system_mask)
                .ok()?;
        }
        match process_mask.count_ones() {
            0 => None,
            n => Some(n as usize),
        }
    }

    fn supports_gpu_preference(&self) -> bool {
        true
    }

    fn gpu_preference(&self, exe: &Path) -> Result<Option<GpuPreference>, String> {
        Self::read_preference_value(exe)
            .map(|data| data.as_deref().and_then(Self::parse_gpu_preference))
            .map_err(|e| format!("Failed to read GPU preference for {:?}: {}", exe, e))
    }

    fn set_gpu_preference(&self, exe: &Path, preference: GpuPreference) -> Result<(), String> {
        (|| {
            let existing = Self::read_preference_value(exe)?.unwrap_or_default();
            let hkcu = RegKey::predef(HKEY_CURRENT_USER);
            let (key, _) = hkcu.create_subkey(GPU_PREFERENCES_KEY)?;
            key.set_value(exe.as_os_str(), &Self::merge_gpu_preference(&existing, preference))?;
            Ok(())
        })()
        .map_err(|e: OsError| format!("Failed to store GPU preference for {:?}: {}", exe, e))
    }

    /// Windows has no exec; the replacement is started as a new process and
    /// this one exits. The new PID is visible to whoever launched us.
    fn execute_process(
        &self,
        path: &Path,
        args: &[OsString],
        envs: &[(OsString, OsString)],
    ) -> String {
        let spawned = Command::new(path)
            .args(args)
            .envs(envs.iter().cloned())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn();
        match spawned {
            Ok(_) => std::process::exit(0),
            Err(e) => format!("CreateProcess {:?} failed: {}", path, e),
        }
    }
}
