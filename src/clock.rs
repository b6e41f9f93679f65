pub type Tick = u64;

/// Number of ticks between two interest commits.
pub const MONTH_LENGTH: Tick = 30;

/// Source of simulated time.
///
/// The bank only ever reads [`Clock::now`]; advancing time is up to whoever
/// drives the simulation.
pub trait Clock {
    fn now(&self) -> Tick;

    fn advance(&mut self, ticks: Tick);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualClock {
    now: Tick,
}

impl ManualClock {
    pub fn starting_at(now: Tick) -> Self {
        Self { now }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Tick {
        self.now
    }

    fn advance(&mut self, ticks: Tick) {
        self.now = self.now.saturating_add(ticks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_moves_forward() {
        let mut clock = ManualClock::default();
        assert_eq!(clock.now(), 0);
        clock.advance(1);
        clock.advance(29);
        assert_eq!(clock.now(), MONTH_LENGTH);

        let mut clock = ManualClock::starting_at(Tick::MAX - 1);
        clock.advance(10);
        assert_eq!(clock.now(), Tick::MAX);
    }
}
