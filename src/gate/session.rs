//! Single-writer session wrapper.
//!
//! A front-end that can deliver two attempts against the same session at once
//! (a double-click, two handlers) holds the session in a `SessionCell`. The
//! lock is held across the whole gate call, so the quota read and the
//! increment can never interleave with another attempt.

use std::sync::{Mutex, MutexGuard};

use crate::domain::{ConversionRequest, SessionState};
use crate::gate::policy::{Attempt, Gate};

#[derive(Debug, Default)]
pub struct SessionCell {
    state: Mutex<SessionState>,
}

impl SessionCell {
    pub fn new(state: SessionState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Snapshot of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    pub fn attempt(&self, gate: &Gate, request: &ConversionRequest) -> Attempt {
        let mut guard = self.lock();
        let current = std::mem::take(&mut *guard);
        let (next, attempt) = gate.attempt_conversion(current, request);
        *guard = next;
        attempt
    }

    pub fn login(&self, username: impl Into<String>) {
        let mut guard = self.lock();
        let current = std::mem::take(&mut *guard);
        *guard = current.login(username);
    }

    pub fn logout(&self) {
        let mut guard = self.lock();
        let current = std::mem::take(&mut *guard);
        *guard = current.logout();
    }

    // A panic inside the gate cannot leave a half-written state (the value is
    // replaced in one assignment), so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::domain::ConversionOutcome;

    #[test]
    fn concurrent_guest_attempts_never_exceed_the_limit() {
        let gate = Gate::default();
        let cell = Arc::new(SessionCell::default());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let cell = Arc::clone(&cell);
                thread::spawn(move || {
                    let request = ConversionRequest::new("Mass", "Kilograms to Pounds", 1.0);
                    cell.attempt(&gate, &request)
                })
            })
            .collect();

        let allowed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|a| a.outcome.is_allowed())
            .count();

        assert_eq!(allowed, 5);
        assert_eq!(cell.snapshot().guest_count(), Some(5));
    }

    #[test]
    fn login_and_logout_go_through_the_cell() {
        let gate = Gate::default();
        let cell = SessionCell::new(SessionState::Anonymous { guest_count: 5 });

        cell.login("carol");
        let attempt = cell.attempt(&gate, &ConversionRequest::new("Time", "Days to Hours", 2.0));
        assert_eq!(attempt.outcome, ConversionOutcome::Allowed(48.0));
        assert_eq!(attempt.record.map(|r| r.username), Some("carol".to_string()));

        cell.logout();
        assert_eq!(cell.snapshot(), SessionState::Anonymous { guest_count: 0 });
    }
}
