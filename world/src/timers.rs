//! Cancellable one-shot timers measured on the simulated session clock.

use std::time::Duration;

/// Revocable reference to a pending timer.
///
/// Handles are never reused, so cancelling a handle whose timer already fired
/// or was revoked is a harmless no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct TimerHandle(u64);

#[derive(Clone, Copy, Debug)]
struct PendingTimer<K> {
    handle: TimerHandle,
    deadline: Duration,
    kind: K,
}

/// One-shot timers that fire in deadline order, ties broken by arming order.
#[derive(Debug)]
pub(crate) struct TimerQueue<K> {
    now: Duration,
    next_handle: u64,
    pending: Vec<PendingTimer<K>>,
}

impl<K: Copy> TimerQueue<K> {
    pub(crate) fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_handle: 0,
            pending: Vec::new(),
        }
    }

    /// Current reading of the simulated clock.
    pub(crate) fn now(&self) -> Duration {
        self.now
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }

    pub(crate) fn arm(&mut self, delay: Duration, kind: K) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.pending.push(PendingTimer {
            handle,
            deadline: self.now.saturating_add(delay),
            kind,
        });
        handle
    }

    /// Revokes the timer, returning whether it was still pending.
    pub(crate) fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.handle != handle);
        self.pending.len() != before
    }

    pub(crate) fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// Earliest deadline among pending timers.
    pub(crate) fn next_deadline(&self) -> Option<Duration> {
        self.pending.iter().map(|timer| timer.deadline).min()
    }

    /// Time left before the timer fires, if it is still pending.
    pub(crate) fn remaining(&self, handle: TimerHandle) -> Option<Duration> {
        self.pending
            .iter()
            .find(|timer| timer.handle == handle)
            .map(|timer| timer.deadline.saturating_sub(self.now))
    }

    /// Removes and returns the earliest timer whose deadline has passed.
    ///
    /// Callers drain due timers one at a time so that a firing which cancels
    /// other timers takes effect before the next one is considered.
    pub(crate) fn pop_due(&mut self) -> Option<(TimerHandle, K)> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.deadline <= self.now)
            .min_by_key(|(_, timer)| (timer.deadline, timer.handle))
            .map(|(index, _)| index)?;
        let timer = self.pending.swap_remove(index);
        Some((timer.handle, timer.kind))
    }
}
