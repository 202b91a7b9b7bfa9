//! Diagnostics carried by a job: progress ticks and the basic block
//! profiler back-reference. Neither affects the generated code.

/// Counts units of work done by long-running pipeline phases.
///
/// Phases call [`TickCounter::tick`] between work units; the scheduler can
/// read the count to spot stuck or runaway jobs.
#[derive(Debug, Default, Clone)]
pub struct TickCounter {
    ticks: u64,
}

impl TickCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self) {
        self.ticks += 1;
    }

    pub fn current_tick_count(&self) -> u64 {
        self.ticks
    }
}

/// Non-owning reference to basic block profiler storage.
///
/// The profiler owns the data; the id neither extends its lifetime nor
/// implies exclusive access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProfilerDataId(pub u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_accumulate() {
        let mut counter = TickCounter::new();
        counter.tick();
        counter.tick();
        assert_eq!(counter.current_tick_count(), 2);
    }
}
