use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Progress of a transport's abort request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AbortState {
    NotStarted = 0,
    Started = 1,
}

impl AbortState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => AbortState::NotStarted,
            _ => AbortState::Started,
        }
    }
}

/// One-shot abort guard
///
/// `try_start` succeeds for exactly one caller over the guard's lifetime;
/// the check and the transition happen in a single compare-and-swap.
#[derive(Debug)]
pub(crate) struct AbortGuard {
    state: AtomicU8,
    completed: AtomicBool,
}

impl AbortGuard {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(AbortState::NotStarted as u8),
            completed: AtomicBool::new(false),
        }
    }

    /// Moves `NotStarted -> Started`; returns false if abort already started
    pub(crate) fn try_start(&self) -> bool {
        self.state
            .compare_exchange(
                AbortState::NotStarted as u8,
                AbortState::Started as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    pub(crate) fn state(&self) -> AbortState {
        AbortState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn complete(&self) {
        self.completed.store(true, Ordering::Release);
    }

    pub(crate) fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }
}
