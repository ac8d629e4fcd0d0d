use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use os_api::{GpuPreference, PlatformProcessControl};

/// Present in the environment of a relaunched process so it does not request
/// another relaunch.
pub const RESTARTED_ENV: &str = "ENGINE_BOOTSTRAP_RESTARTED";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestartDecision {
    NotNeeded,
    /// The preference was just stored; it only applies to a fresh process.
    Recommended,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct GpuProfileDecision {
    pub already_correct: bool,
    pub changed: bool,
}

/// The executable whose GPU preference matters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProfileTarget {
    /// This process creates the GPU device itself; a change needs a relaunch.
    CurrentProcess(PathBuf),
    /// A program this process starts later; a change applies when it starts.
    Child(PathBuf),
}

impl ProfileTarget {
    /// The running executable, falling back to `args[0]`.
    pub fn current(args: &[OsString]) -> Option<Self> {
        env::current_exe()
            .ok()
            .or_else(|| args.first().map(PathBuf::from))
            .map(Self::CurrentProcess)
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::CurrentProcess(path) | Self::Child(path) => path,
        }
    }
}

pub fn already_restarted() -> bool {
    env::var_os(RESTARTED_ENV).is_some()
}

/// Makes sure `exe` is registered for `desired`.
///
/// Stores the preference when it is missing or different; never restarts by
/// itself. Nothing is written when the preference is already in place.
pub fn check_profile<P>(platform: &P, exe: &Path, desired: GpuPreference) -> GpuProfileDecision
where
    P: PlatformProcessControl + ?Sized,
{
    if !platform.supports_gpu_preference() {
        return GpuProfileDecision::default();
    }

    let current = platform.gpu_preference(exe).unwrap_or_else(|e| {
        tracing::warn!("{e}");
        None
    });
    if current == Some(desired) {
        tracing::debug!(exe = %exe.display(), ?desired, "GPU preference already set");
        return GpuProfileDecision {
            already_correct: true,
            changed: false,
        };
    }

    match platform.set_gpu_preference(exe, desired) {
        Ok(()) => {
            tracing::info!(exe = %exe.display(), ?current, ?desired, "GPU preference stored");
            GpuProfileDecision {
                already_correct: false,
                changed: true,
            }
        }
        Err(e) => {
            tracing::warn!("{e}; continuing on the default GPU");
            GpuProfileDecision::default()
        }
    }
}

/// [`check_profile`] for `target`, reduced to whether this process should relaunch.
pub fn resolve_profile<P>(platform: &P, target: &ProfileTarget, desired: GpuPreference) -> RestartDecision
where
    P: PlatformProcessControl + ?Sized,
{
    if !check_profile(platform, target.path(), desired).changed {
        return RestartDecision::NotNeeded;
    }
    match target {
        ProfileTarget::Child(exe) => {
            tracing::info!(exe = %exe.display(), "GPU preference applies when the program starts");
            RestartDecision::NotNeeded
        }
        ProfileTarget::CurrentProcess(_) if already_restarted() => {
            tracing::warn!("GPU preference changed again after a relaunch, not restarting twice");
            RestartDecision::NotNeeded
        }
        ProfileTarget::CurrentProcess(_) => RestartDecision::Recommended,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    #[derive(Default)]
    struct Store {
        supported: bool,
        prefs: RefCell<HashMap<PathBuf, GpuPreference>>,
        writes: Cell<usize>,
        fail_writes: bool,
    }

    impl Store {
        fn supported() -> Self {
            Self {
                supported: true,
                ..Default::default()
            }
        }
    }

    impl PlatformProcessControl for Store {
        fn supports_gpu_preference(&self) -> bool {
            self.supported
        }

        fn gpu_preference(&self, exe: &Path) -> Result<Option<GpuPreference>, String> {
            Ok(self.prefs.borrow().get(exe).copied())
        }

        fn set_gpu_preference(&self, exe: &Path, preference: GpuPreference) -> Result<(), String> {
            if self.fail_writes {
                return Err("access denied".into());
            }
            self.writes.set(self.writes.get() + 1);
            self.prefs.borrow_mut().insert(exe.to_path_buf(), preference);
            Ok(())
        }

        fn execute_process(
            &self,
            _path: &Path,
            _args: &[OsString],
            _envs: &[(OsString, OsString)],
        ) -> String {
            "not used".into()
        }
    }

    fn exe() -> PathBuf {
        PathBuf::from("/opt/engine/spring")
    }

    #[test]
    fn unsupported_platform_is_a_no_op() {
        let store = Store::default();
        let decision = check_profile(&store, &exe(), GpuPreference::HighPerformance);
        assert_eq!(decision, GpuProfileDecision::default());
        assert_eq!(store.writes.get(), 0);
    }

    #[test]
    fn missing_preference_is_stored_once() {
        let store = Store::supported();
        let first = check_profile(&store, &exe(), GpuPreference::HighPerformance);
        assert!(first.changed && !first.already_correct);

        let second = check_profile(&store, &exe(), GpuPreference::HighPerformance);
        assert!(second.already_correct && !second.changed);
        assert_eq!(store.writes.get(), 1);
    }

    #[test]
    fn repeated_check_of_correct_preference_is_stable() {
        let store = Store::supported();
        store.prefs.borrow_mut().insert(exe(), GpuPreference::HighPerformance);
        let target = ProfileTarget::CurrentProcess(exe());

        let first = check_profile(&store, &exe(), GpuPreference::HighPerformance);
        let second = check_profile(&store, &exe(), GpuPreference::HighPerformance);
        assert_eq!(first, second);
        assert!(first.already_correct);
        assert_eq!(
            resolve_profile(&store, &target, GpuPreference::HighPerformance),
            resolve_profile(&store, &target, GpuPreference::HighPerformance)
        );
        assert_eq!(store.writes.get(), 0);
    }

    #[test]
    fn write_failure_does_not_ask_for_restart() {
        let store = Store {
            fail_writes: true,
            ..Store::supported()
        };
        let target = ProfileTarget::CurrentProcess(exe());
        assert_eq!(
            resolve_profile(&store, &target, GpuPreference::HighPerformance),
            RestartDecision::NotNeeded
        );
    }

    #[test]
    fn different_preference_is_replaced() {
        let store = Store::supported();
        store.prefs.borrow_mut().insert(exe(), GpuPreference::PowerSaving);

        let decision = check_profile(&store, &exe(), GpuPreference::HighPerformance);
        assert!(decision.changed);
        assert_eq!(store.prefs.borrow()[&exe()], GpuPreference::HighPerformance);
    }

    #[test]
    fn child_target_is_written_without_restart() {
        let store = Store::supported();
        let target = ProfileTarget::Child(exe());

        assert_eq!(
            resolve_profile(&store, &target, GpuPreference::HighPerformance),
            RestartDecision::NotNeeded
        );
        assert_eq!(store.prefs.borrow().get(&exe()), Some(&GpuPreference::HighPerformance));
    }
}
