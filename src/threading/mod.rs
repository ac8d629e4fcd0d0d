mod error_channel;
mod registry;
mod worker;

pub use error_channel::{
    get_thread_error, set_thread_error, take_thread_error, ThreadError, ThreadErrorChannel,
};
pub use registry::{
    core_count, detect_cores, is_main_thread, set_main_thread, topology, CoreTopology,
    ThreadRegistry,
};
pub(crate) use worker::panic_payload_text;
pub use worker::spawn_worker;
