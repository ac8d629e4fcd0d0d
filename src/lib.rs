pub mod app;
pub mod bootstrap;
pub mod command_app;
pub mod config;
pub mod error_report;
pub mod gpu_profile;
pub mod lifecycle;
pub mod logging;
pub mod relaunch;
pub mod threading;

pub use app::{AppError, Application};
pub use error_report::{FatalErrorReporter, FatalReport, MessageFlags};
pub use lifecycle::{main_entry, run_lifecycle};
