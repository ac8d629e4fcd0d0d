#![allow(dead_code)]

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use engine_bootstrap::config::BootstrapConfig;
use engine_bootstrap::error_report::{Acknowledgement, ErrorPresenter, FatalReport};
use engine_bootstrap::lifecycle::{run_lifecycle, BootstrapContext};
use engine_bootstrap::{Application, FatalErrorReporter};
use os_api::{GpuPreference, PlatformProcessControl};

/// One recorded `execute_process` call: program, arguments, extra environment.
pub type ExecCall = (PathBuf, Vec<OsString>, Vec<(OsString, OsString)>);

/// In-memory platform: preferences live in a map, exec attempts are recorded.
#[derive(Default)]
pub struct FakePlatform {
    pub supports_gpu: bool,
    pub prefs: Mutex<HashMap<PathBuf, GpuPreference>>,
    pub pref_writes: Mutex<usize>,
    pub exec_calls: Mutex<Vec<ExecCall>>,
    pub exec_error: String,
}

impl FakePlatform {
    pub fn with_gpu_support(exec_error: &str) -> Self {
        Self {
            supports_gpu: true,
            exec_error: exec_error.to_string(),
            ..Default::default()
        }
    }

    pub fn preset(&self, preference: GpuPreference) {
        let exe = std::env::current_exe().unwrap();
        self.prefs.lock().unwrap().insert(exe, preference);
    }

    pub fn written_paths(&self) -> Vec<PathBuf> {
        self.prefs.lock().unwrap().keys().cloned().collect()
    }
}

impl PlatformProcessControl for FakePlatform {
    fn available_cores(&self) -> Option<usize> {
        Some(4)
    }

    fn supports_gpu_preference(&self) -> bool {
        self.supports_gpu
    }

    fn gpu_preference(&self, exe: &Path) -> Result<Option<GpuPreference>, String> {
        Ok(self.prefs.lock().unwrap().get(exe).copied())
    }

    fn set_gpu_preference(&self, exe: &Path, preference: GpuPreference) -> Result<(), String> {
        *self.pref_writes.lock().unwrap() += 1;
        self.prefs.lock().unwrap().insert(exe.to_path_buf(), preference);
        Ok(())
    }

    fn execute_process(
        &self,
        path: &Path,
        args: &[OsString],
        envs: &[(OsString, OsString)],
    ) -> String {
        self.exec_calls
            .lock()
            .unwrap()
            .push((path.to_path_buf(), args.to_vec(), envs.to_vec()));
        self.exec_error.clone()
    }
}

/// Captures every presented report and answers with a fixed acknowledgement.
#[derive(Clone)]
pub struct RecordingPresenter {
    pub reports: Arc<Mutex<Vec<FatalReport>>>,
    pub answer: Acknowledgement,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self {
            reports: Arc::default(),
            answer: Acknowledgement::Dismissed,
        }
    }

    pub fn reports(&self) -> Vec<FatalReport> {
        self.reports.lock().unwrap().clone()
    }
}

impl ErrorPresenter for RecordingPresenter {
    fn present(&self, report: &FatalReport) -> Acknowledgement {
        self.reports.lock().unwrap().push(report.clone());
        self.answer
    }
}

pub fn argv(items: &[&str]) -> Vec<OsString> {
    items.iter().map(OsString::from).collect()
}

/// Runs the full lifecycle for `A` and returns the exit code and what was shown.
pub fn run_with<A: Application>(
    args: &[OsString],
    platform: &FakePlatform,
    config: &BootstrapConfig,
    presenter: RecordingPresenter,
) -> (i32, Vec<FatalReport>) {
    let reporter = FatalErrorReporter::new(Box::new(presenter.clone()));
    let ctx = BootstrapContext {
        platform,
        reporter: &reporter,
        config,
    };
    let status = run_lifecycle::<A>(args, &ctx);
    (status, presenter.reports())
}
