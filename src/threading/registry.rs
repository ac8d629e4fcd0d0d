use std::thread::{self, ThreadId};

use once_cell::sync::OnceCell;

/// Main thread identity plus the usable core count, fixed at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoreTopology {
    pub main_thread: ThreadId,
    pub core_count: usize,
}

/// Write-once record of the process threading layout.
///
/// Both halves are published independently, but [`ThreadRegistry::topology`]
/// only hands out a value once both are in place.
#[derive(Default)]
pub struct ThreadRegistry {
    main_thread: OnceCell<ThreadId>,
    core_count: OnceCell<usize>,
}

impl ThreadRegistry {
    pub const fn new() -> Self {
        Self {
            main_thread: OnceCell::new(),
            core_count: OnceCell::new(),
        }
    }

    /// Stores the core count from `count`, falling back to `num_cpus` and then
    /// to a single core. Later calls keep the first value.
    pub fn detect_cores<F>(&self, count: F) -> usize
    where
        F: FnOnce() -> Option<usize>,
    {
        *self.core_count.get_or_init(|| {
            let detected = count()
                .filter(|&n| n > 0)
                .unwrap_or_else(num_cpus::get)
                .max(1);
            tracing::debug!(cores = detected, "detected usable cores");
            detected
        })
    }

    /// Records the calling thread as main. Later calls keep the first thread.
    pub fn set_main_thread(&self) -> ThreadId {
        *self.main_thread.get_or_init(|| {
            let current = thread::current();
            tracing::debug!(thread = ?current.id(), name = ?current.name(), "main thread registered");
            current.id()
        })
    }

    pub fn topology(&self) -> Option<CoreTopology> {
        Some(CoreTopology {
            main_thread: *self.main_thread.get()?,
            core_count: *self.core_count.get()?,
        })
    }

    pub fn is_main_thread(&self) -> bool {
        self.main_thread
            .get()
            .is_some_and(|&id| id == thread::current().id())
    }

    pub fn core_count(&self) -> usize {
        self.core_count.get().copied().unwrap_or(1)
    }
}

static REGISTRY: ThreadRegistry = ThreadRegistry::new();

pub fn detect_cores<F>(count: F) -> usize
where
    F: FnOnce() -> Option<usize>,
{
    REGISTRY.detect_cores(count)
}

pub fn set_main_thread() -> ThreadId {
    REGISTRY.set_main_thread()
}

pub fn topology() -> Option<CoreTopology> {
    REGISTRY.topology()
}

pub fn is_main_thread() -> bool {
    REGISTRY.is_main_thread()
}

/// Usable cores, or 1 before detection has run.
pub fn core_count() -> usize {
    REGISTRY.core_count()
}
