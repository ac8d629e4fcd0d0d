use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use crate::error_report::MessageFlags;

/// A fatal condition raised on some thread, reported once the application returns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThreadError {
    pub message: String,
    pub caption: String,
    pub flags: MessageFlags,
    pub thread: ThreadId,
    pub thread_name: Option<String>,
}

impl ThreadError {
    /// Builds a record attributed to the calling thread.
    pub fn new(message: impl Into<String>, caption: impl Into<String>, flags: MessageFlags) -> Self {
        let current = thread::current();
        Self {
            message: message.into(),
            caption: caption.into(),
            flags,
            thread: current.id(),
            thread_name: current.name().map(str::to_owned),
        }
    }
}

/// Single-slot mailbox for [`ThreadError`]s.
///
/// Writers may race; the newest record replaces a pending one.
#[derive(Default)]
pub struct ThreadErrorChannel {
    slot: Mutex<Option<ThreadError>>,
}

impl ThreadErrorChannel {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    // The slot holds plain data, so a writer that panicked mid-publish cannot
    // leave it half-written.
    fn lock(&self) -> MutexGuard<'_, Option<ThreadError>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publishes `error`, replacing any record that is still pending.
    pub fn publish(&self, error: ThreadError) {
        tracing::error!(
            thread = ?error.thread,
            name = ?error.thread_name,
            caption = %error.caption,
            "thread error: {}",
            error.message
        );
        if let Some(previous) = self.lock().replace(error) {
            tracing::warn!(
                thread = ?previous.thread,
                "overwrote pending thread error: {}",
                previous.message
            );
        }
    }

    /// Clone of the pending record, leaving it in place.
    pub fn peek(&self) -> Option<ThreadError> {
        self.lock().clone()
    }

    /// Removes and returns the pending record.
    pub fn take(&self) -> Option<ThreadError> {
        self.lock().take()
    }
}

static CHANNEL: ThreadErrorChannel = ThreadErrorChannel::new();

pub fn set_thread_error(error: ThreadError) {
    CHANNEL.publish(error);
}

pub fn get_thread_error() -> Option<ThreadError> {
    CHANNEL.peek()
}

pub fn take_thread_error() -> Option<ThreadError> {
    CHANNEL.take()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn empty_channel_reads_absent() {
        let channel = ThreadErrorChannel::new();
        assert_eq!(channel.peek(), None);
        assert_eq!(channel.take(), None);
    }

    #[test]
    fn worker_record_is_visible_after_join() {
        let channel = Arc::new(ThreadErrorChannel::new());
        let worker = {
            let channel = Arc::clone(&channel);
            thread::Builder::new()
                .name("loader".into())
                .spawn(move || {
                    channel.publish(ThreadError::new(
                        "texture pool exhausted",
                        "Loader error",
                        MessageFlags::FATAL,
                    ));
                    thread::current().id()
                })
                .unwrap()
        };
        let worker_id = worker.join().unwrap();

        let seen = channel.peek().expect("record published");
        assert_eq!(seen.message, "texture pool exhausted");
        assert_eq!(seen.caption, "Loader error");
        assert_eq!(seen.thread, worker_id);
        assert_eq!(seen.thread_name.as_deref(), Some("loader"));
    }

    #[test]
    fn last_write_wins() {
        let channel = ThreadErrorChannel::new();
        channel.publish(ThreadError::new("first", "A", MessageFlags::OK));
        channel.publish(ThreadError::new("second", "B", MessageFlags::OK));

        assert_eq!(channel.take().map(|e| e.message), Some("second".to_string()));
        assert_eq!(channel.take(), None);
    }

    #[test]
    fn concurrent_writers_leave_one_whole_record() {
        let channel = Arc::new(ThreadErrorChannel::new());
        let workers: Vec<_> = (0..8)
            .map(|i| {
                let channel = Arc::clone(&channel);
                thread::spawn(move || {
                    channel.publish(ThreadError::new(
                        format!("worker {i} failed"),
                        format!("caption {i}"),
                        MessageFlags::FATAL,
                    ));
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let record = channel.take().expect("one record survives");
        let index = record
            .message
            .trim_start_matches("worker ")
            .trim_end_matches(" failed");
        assert_eq!(record.caption, format!("caption {index}"));
    }
}
