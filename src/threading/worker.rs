use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use super::error_channel::{set_thread_error, ThreadError};
use crate::error_report::MessageFlags;

pub(crate) fn panic_payload_text(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Spawns a named worker whose escaping panic is a fatal thread error.
///
/// Only a panic that unwinds out of `f` is published; one caught inside `f`
/// is the worker's own business. The panic is resumed afterwards, so
/// `join` still returns `Err`.
pub fn spawn_worker<F, T>(name: impl Into<String>, f: F) -> io::Result<JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    thread::Builder::new().name(name.into()).spawn(move || {
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(value) => value,
            Err(payload) => {
                set_thread_error(ThreadError::new(
                    panic_payload_text(payload.as_ref()),
                    "Thread panic",
                    MessageFlags::FATAL,
                ));
                panic::resume_unwind(payload)
            }
        }
    })
}
