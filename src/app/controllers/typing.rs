use std::time::Duration;

use super::debounce::Pulse;
use crate::app::infrastructure::scheduler::Scheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum TypingState {
    #[default]
    Idle,
    Typing,
}

/// Coarse "the user is mid-edit" signal used to arbitrate navigation.
///
/// Any change moves to `Typing` and re-arms the idle timer; only the
/// `TypingIdle` pulse moves back to `Idle`. The window is longer than the
/// render/persist windows, so those pulses fire while this still reports
/// typing. It never gates rendering.
#[derive(Debug, Clone)]
pub struct TypingStateTracker {
    state: TypingState,
    idle_window: Duration,
}

impl TypingStateTracker {
    pub fn new(idle_window: Duration) -> Self {
        Self {
            state: TypingState::Idle,
            idle_window,
        }
    }

    pub fn note_change(&mut self, scheduler: &mut Scheduler<Pulse>, now: Duration) {
        if self.state == TypingState::Idle {
            log::debug!("typing started");
        }
        self.state = TypingState::Typing;
        scheduler.schedule(Pulse::TypingIdle, self.idle_window, now);
    }

    /// Handle the `TypingIdle` pulse.
    pub fn settle(&mut self) {
        if self.state == TypingState::Typing {
            log::debug!("typing settled");
        }
        self.state = TypingState::Idle;
    }

    pub fn is_typing(&self) -> bool {
        self.state == TypingState::Typing
    }
}
