//! Timer bookkeeping for the round
//!
//! Every periodic activity (spawn, motion, clock, countdown) and every
//! deferred removal is an entry here, addressed by a [`TimerToken`]. Virtual
//! time only moves forward through [`Schedule::elapse`]; the tick loop pulls
//! due timers with [`Schedule::take_due`] and fires them in order.

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Advance falling words, then re-check collisions
    Motion,
    /// Drop a new word
    Spawn,
    /// Count the round clock down by one second
    Clock,
    /// Resume countdown step
    Countdown,
    /// Remove a caught word
    RemoveWord(u32),
    /// Remove a floating "+5" / "-5"
    ExpireFeedback(u32),
}

impl TimerKind {
    /// Tie-break for timers due at the same instant
    fn priority(&self) -> u8 {
        match self {
            TimerKind::Motion => 0,
            TimerKind::Spawn => 1,
            TimerKind::Clock => 2,
            TimerKind::Countdown => 3,
            TimerKind::RemoveWord(_) => 4,
            TimerKind::ExpireFeedback(_) => 5,
        }
    }

    /// Periodic round activities, as opposed to deferred one-shots
    pub fn is_periodic(&self) -> bool {
        matches!(
            self,
            TimerKind::Motion | TimerKind::Spawn | TimerKind::Clock | TimerKind::Countdown
        )
    }
}

/// Cancellation handle for a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

#[derive(Debug, Clone)]
struct Timer {
    token: TimerToken,
    kind: TimerKind,
    /// `Some` for repeating timers
    period_ms: Option<u32>,
    remaining_ms: u32,
}

/// Outstanding timers for one round
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    timers: Vec<Timer>,
    next_token: u64,
    /// Bumped whenever timers are cancelled in bulk
    generation: u64,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, kind: TimerKind, period_ms: Option<u32>, delay_ms: u32) -> TimerToken {
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.timers.push(Timer {
            token,
            kind,
            period_ms,
            remaining_ms: delay_ms.max(1),
        });
        token
    }

    /// Fire `kind` every `period_ms`, first after one full period
    pub fn every(&mut self, kind: TimerKind, period_ms: u32) -> TimerToken {
        let period_ms = period_ms.max(1);
        self.insert(kind, Some(period_ms), period_ms)
    }

    /// Fire `kind` once after `delay_ms`
    pub fn after(&mut self, kind: TimerKind, delay_ms: u32) -> TimerToken {
        self.insert(kind, None, delay_ms)
    }

    /// Cancel one timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.token != token);
        self.timers.len() != before
    }

    /// Cancel every periodic activity, leaving deferred one-shots alone
    pub fn cancel_periodic(&mut self) {
        self.timers.retain(|t| !t.kind.is_periodic());
        self.generation += 1;
    }

    /// Cancel everything
    pub fn clear(&mut self) {
        self.timers.clear();
        self.generation += 1;
    }

    /// Changes whenever a bulk cancel happens, so a batch of due timers can
    /// tell that the rest of the batch was cancelled under it
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_armed(&self, token: TimerToken) -> bool {
        self.timers.iter().any(|t| t.token == token)
    }

    /// Whether any timer of this kind is pending
    pub fn has(&self, kind: TimerKind) -> bool {
        self.timers.iter().any(|t| t.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Milliseconds until the next timer is due
    pub(crate) fn next_due(&self) -> Option<u32> {
        self.timers.iter().map(|t| t.remaining_ms).min()
    }

    /// Move virtual time forward. Callers never elapse past `next_due`.
    pub(crate) fn elapse(&mut self, ms: u32) {
        for timer in &mut self.timers {
            timer.remaining_ms = timer.remaining_ms.saturating_sub(ms);
        }
    }

    /// Pop every timer that is due, in firing order. Periodic timers are
    /// re-armed for their next period, one-shots are removed.
    pub(crate) fn take_due(&mut self) -> Vec<(TimerToken, TimerKind)> {
        let mut due: Vec<(u8, TimerToken, TimerKind)> = self
            .timers
            .iter()
            .filter(|t| t.remaining_ms == 0)
            .map(|t| (t.kind.priority(), t.token, t.kind))
            .collect();
        due.sort_by_key(|(priority, token, _)| (*priority, *token));

        self.timers.retain(|t| t.remaining_ms > 0 || t.period_ms.is_some());
        for timer in &mut self.timers {
            if timer.remaining_ms == 0 {
                timer.remaining_ms = timer.period_ms.unwrap_or(1);
            }
        }

        due.into_iter().map(|(_, token, kind)| (token, kind)).collect()
    }
}
