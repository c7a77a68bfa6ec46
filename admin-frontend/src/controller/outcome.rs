use std::time::{Duration, Instant};

/// Success or error banner produced by a fetch or a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    pub succeeded: bool,
    pub message: String,
}

impl MutationOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            message: message.into(),
        }
    }
}

/// Holds at most one outcome and forgets it once its display time is over.
///
/// A new outcome replaces the current one instead of queueing behind it.
#[derive(Debug)]
pub struct OutcomeSlot {
    current: Option<(MutationOutcome, Instant)>,
    ttl: Duration,
}

impl OutcomeSlot {
    pub fn new(ttl: Duration) -> Self {
        Self { current: None, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn set(&mut self, outcome: MutationOutcome) {
        self.set_at(outcome, Instant::now());
    }

    pub fn set_at(&mut self, outcome: MutationOutcome, now: Instant) {
        self.current = Some((outcome, now + self.ttl));
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Drops an error banner, leaving a success one in place.
    pub fn clear_error(&mut self) {
        if matches!(&self.current, Some((outcome, _)) if !outcome.succeeded) {
            self.current = None;
        }
    }

    pub fn current(&mut self) -> Option<MutationOutcome> {
        self.current_at(Instant::now())
    }

    pub fn current_at(&mut self, now: Instant) -> Option<MutationOutcome> {
        match &self.current {
            Some((_, expires_at)) if now >= *expires_at => {
                self.current = None;
                None
            }
            Some((outcome, _)) => Some(outcome.clone()),
            None => None,
        }
    }
}
