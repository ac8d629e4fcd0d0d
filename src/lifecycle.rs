use std::ffi::OsString;

use os_api::PlatformProcessControl;

use crate::app::Application;
use crate::bootstrap::{run_application, RunOutcome, BOOTSTRAP_FAILED};
use crate::config::BootstrapConfig;
use crate::error_report::{FatalErrorReporter, FatalReport, MessageFlags};
use crate::gpu_profile::{resolve_profile, ProfileTarget, RestartDecision};
use crate::logging;
use crate::relaunch::RestartRequest;
use crate::threading::{self, ThreadError};

const EXEC_ERROR_CAPTION: &str = "Execv error:";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecyclePhase {
    Start,
    ResolvingGpuProfile,
    Restarting,
    Proceeding,
    DetectingThreads,
    RunningApplication,
    CheckingThreadErrors,
    ReportingError,
    Exit,
}

struct Lifecycle {
    phase: LifecyclePhase,
}

impl Lifecycle {
    fn new() -> Self {
        Self {
            phase: LifecyclePhase::Start,
        }
    }

    fn enter(&mut self, next: LifecyclePhase) {
        tracing::debug!(from = ?self.phase, to = ?next, "lifecycle");
        self.phase = next;
    }
}

/// Collaborators the lifecycle runs against.
pub struct BootstrapContext<'a> {
    pub platform: &'a dyn PlatformProcessControl,
    pub reporter: &'a FatalErrorReporter,
    pub config: &'a BootstrapConfig,
}

/// Replaces the process and, if that comes back, reports the failure.
fn relaunch(request: RestartRequest, ctx: &BootstrapContext<'_>) -> i32 {
    let error = request.execute(ctx.platform);
    ctx.reporter
        .report(&error, EXEC_ERROR_CAPTION, MessageFlags::FATAL, false);
    BOOTSTRAP_FAILED
}

/// Folds the run result and a pending thread error into at most one report.
pub fn compose_report(outcome: &RunOutcome, thread_error: Option<ThreadError>) -> Option<FatalReport> {
    let Some(thread_error) = thread_error else {
        return outcome.failure.clone();
    };

    let mut message = format!("[run] error: {}", thread_error.message);
    if outcome.failure.is_none() && outcome.status != 0 {
        message.push_str(&format!(" (exit code {})", outcome.status));
    }

    match &outcome.failure {
        None => Some(
            FatalReport::new(message, thread_error.caption, thread_error.flags).restartable(true),
        ),
        Some(failure) => Some(FatalReport::new(
            format!("{}\n{}", failure.message, message),
            failure.caption.clone(),
            failure.flags | thread_error.flags,
        )),
    }
}

/// Where the GPU preference goes: the application's own GPU program if it
/// names one, otherwise this executable.
pub fn profile_target<A: Application>(args: &[OsString]) -> Option<ProfileTarget> {
    match A::gpu_executable(args) {
        Some(exe) => Some(ProfileTarget::Child(exe)),
        None => ProfileTarget::current(args),
    }
}

/// Drives one process start from GPU preference check to exit code.
pub fn run_lifecycle<A: Application>(args: &[OsString], ctx: &BootstrapContext<'_>) -> i32 {
    let mut lifecycle = Lifecycle::new();

    lifecycle.enter(LifecyclePhase::ResolvingGpuProfile);
    let target = ctx.config.gpu_preference.zip(profile_target::<A>(args));
    if let Some((desired, target)) = target {
        if resolve_profile(ctx.platform, &target, desired) == RestartDecision::Recommended {
            match RestartRequest::from_args(args) {
                Some(request) if ctx.config.restart_on_profile_change => {
                    lifecycle.enter(LifecyclePhase::Restarting);
                    return relaunch(request, ctx);
                }
                _ => tracing::info!("GPU preference applies from the next start"),
            }
        }
    }
    lifecycle.enter(LifecyclePhase::Proceeding);

    // Must be in place before the application starts any worker thread.
    lifecycle.enter(LifecyclePhase::DetectingThreads);
    threading::set_main_thread();
    threading::detect_cores(|| ctx.platform.available_cores());

    lifecycle.enter(LifecyclePhase::RunningApplication);
    let outcome = run_application::<A>(args);

    lifecycle.enter(LifecyclePhase::CheckingThreadErrors);
    let thread_error = threading::take_thread_error();
    if let Some(err) = &thread_error {
        tracing::error!(status = outcome.status, "[run] pending thread error: {}", err.message);
    }

    if let Some(report) = compose_report(&outcome, thread_error) {
        lifecycle.enter(LifecyclePhase::ReportingError);
        let response = ctx.reporter.submit(&report);
        if response.restart {
            // The application has fully returned; this is a fresh start on user request.
            if let Some(request) = RestartRequest::from_args(args) {
                return relaunch(request, ctx);
            }
        }
    }

    lifecycle.enter(LifecyclePhase::Exit);
    outcome.status
}

/// Process entry shared by the platform binaries.
pub fn main_entry<A: Application>() -> ! {
    let args: Vec<OsString> = std::env::args_os().collect();

    let (config, config_error) = BootstrapConfig::load();
    logging::init(&config.log_filter);
    if let Some(e) = config_error {
        tracing::warn!("{e}; using default settings");
    }

    let platform = os_api::OS;
    let reporter = FatalErrorReporter::for_mode(config.headless);
    let ctx = BootstrapContext {
        platform: &platform,
        reporter: &reporter,
        config: &config,
    };
    std::process::exit(run_lifecycle::<A>(&args, &ctx))
}
