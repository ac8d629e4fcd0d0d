use std::fmt;

use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

bitflags::bitflags! {
    /// Style bits for a fatal message box.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MessageFlags: u32 {
        const OK = 1;
        const INFO = 1 << 1;
        const EXCLAMATION = 1 << 2;
        const CRASH = 1 << 3;
        /// Default style for fatal conditions.
        const FATAL = Self::OK.bits() | Self::EXCLAMATION.bits();
    }
}

/// One user-facing report for an unrecoverable condition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FatalReport {
    pub message: String,
    pub caption: String,
    pub flags: MessageFlags,
    /// The caller may relaunch the process after the user acknowledges.
    pub restartable: bool,
}

impl FatalReport {
    pub fn new(message: impl Into<String>, caption: impl Into<String>, flags: MessageFlags) -> Self {
        Self {
            message: message.into(),
            caption: caption.into(),
            flags,
            restartable: false,
        }
    }

    pub fn restartable(mut self, restartable: bool) -> Self {
        self.restartable = restartable;
        self
    }
}

impl fmt::Display for FatalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.caption, self.message)
    }
}

/// What the user chose when the report was shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Acknowledgement {
    Dismissed,
    RestartRequested,
}

/// Renders a report to the user. May block until the user responds.
pub trait ErrorPresenter {
    fn present(&self, report: &FatalReport) -> Acknowledgement;
}

/// Native blocking message box.
pub struct DialogPresenter;

impl DialogPresenter {
    fn level(flags: MessageFlags) -> MessageLevel {
        if flags.contains(MessageFlags::CRASH) || flags.contains(MessageFlags::EXCLAMATION) {
            MessageLevel::Error
        } else if flags.contains(MessageFlags::INFO) {
            MessageLevel::Info
        } else {
            MessageLevel::Warning
        }
    }
}

impl ErrorPresenter for DialogPresenter {
    fn present(&self, report: &FatalReport) -> Acknowledgement {
        let dialog = MessageDialog::new()
            .set_level(Self::level(report.flags))
            .set_title(&report.caption);

        if !report.restartable {
            dialog
                .set_description(&report.message)
                .set_buttons(MessageButtons::Ok)
                .show();
            return Acknowledgement::Dismissed;
        }

        let answer = dialog
            .set_description(format!("{}\n\nRestart now?", report.message))
            .set_buttons(MessageButtons::YesNo)
            .show();
        match answer {
            MessageDialogResult::Yes => Acknowledgement::RestartRequested,
            _ => Acknowledgement::Dismissed,
        }
    }
}

/// Headless fallback: the report only goes to the log.
pub struct LogPresenter;

impl ErrorPresenter for LogPresenter {
    fn present(&self, report: &FatalReport) -> Acknowledgement {
        tracing::error!(caption = %report.caption, "{}", report.message);
        Acknowledgement::Dismissed
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportOutcome {
    pub restart: bool,
}

/// Logs every fatal report and hands it to the configured presenter.
pub struct FatalErrorReporter {
    presenter: Box<dyn ErrorPresenter>,
}

impl FatalErrorReporter {
    pub fn new(presenter: Box<dyn ErrorPresenter>) -> Self {
        Self { presenter }
    }

    /// Interactive dialogs unless running headless.
    pub fn for_mode(headless: bool) -> Self {
        if headless {
            Self::new(Box::new(LogPresenter))
        } else {
            Self::new(Box::new(DialogPresenter))
        }
    }

    pub fn report(
        &self,
        message: &str,
        caption: &str,
        flags: MessageFlags,
        restartable: bool,
    ) -> ReportOutcome {
        self.submit(&FatalReport::new(message, caption, flags).restartable(restartable))
    }

    pub fn submit(&self, report: &FatalReport) -> ReportOutcome {
        tracing::error!(
            caption = %report.caption,
            flags = report.flags.bits(),
            restartable = report.restartable,
            "fatal: {}",
            report.message
        );
        let ack = self.presenter.present(report);
        ReportOutcome {
            restart: report.restartable && ack == Acknowledgement::RestartRequested,
        }
    }
}
