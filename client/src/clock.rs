use blastgrid_core::Millis;
use web_time::Instant;

/// Millisecond session clock for callers driving the session in real time.
#[derive(Copy, Clone, Debug)]
pub struct SessionClock {
    started: Instant,
}

impl SessionClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn now(&self) -> Millis {
        self.started.elapsed().as_millis().try_into().unwrap_or(Millis::MAX)
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::start()
    }
}
