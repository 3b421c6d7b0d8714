use std::time::Duration;

use crate::app::infrastructure::scheduler::Scheduler;

/// Timer kinds the engine arms. Each has at most one pending deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pulse {
    /// Re-render the preview from the current documents.
    Render,
    /// Write the current documents into the location fragment.
    Persist,
    /// The typing window elapsed without further edits.
    TypingIdle,
}

/// Trailing-edge debounce for the render and persist pulses.
///
/// Every change re-arms both pulses, whichever document it came from, so a
/// pulse only fires after a full quiet window. Pulse handlers read the
/// documents when they fire, never a snapshot taken when they were armed.
#[derive(Debug, Clone, Copy)]
pub struct DebounceScheduler {
    render_window: Duration,
    persist_window: Duration,
}

impl DebounceScheduler {
    pub fn new(render_window: Duration, persist_window: Duration) -> Self {
        Self {
            render_window,
            persist_window,
        }
    }

    pub fn note_change(&self, scheduler: &mut Scheduler<Pulse>, now: Duration) {
        scheduler.schedule(Pulse::Render, self.render_window, now);
        scheduler.schedule(Pulse::Persist, self.persist_window, now);
    }
}
