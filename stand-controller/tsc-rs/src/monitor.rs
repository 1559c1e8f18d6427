use shared::{
    stand_hal::IG_PRESS_GOOD,
    stand_log::{EventSink, LogEvent},
};

/// Rising-edge detector over the igniter pressure, indifferent to whether the
/// value comes from a real sensor or the simulator.
pub struct IgnitionMonitor {
    pressure_good: bool,
    pressure_ever_good: bool,
    good_since_ms: u32,
}

impl IgnitionMonitor {
    pub fn new() -> Self {
        Self {
            pressure_good: false,
            pressure_ever_good: false,
            good_since_ms: 0,
        }
    }

    pub fn update(&mut self, now_ms: u32, igniter_pressure: i32, log: &mut dyn EventSink) {
        let good = igniter_pressure >= IG_PRESS_GOOD;

        if good && !self.pressure_ever_good {
            log.log_event(now_ms, LogEvent::IgniterGoodFirstTime);
            self.pressure_ever_good = true;
        } else if good && !self.pressure_good {
            log.log_event(now_ms, LogEvent::IgniterGood);
        }

        if good && !self.pressure_good {
            self.good_since_ms = now_ms;
        }
        self.pressure_good = good;
    }

    pub fn pressure_good(&self) -> bool {
        self.pressure_good
    }

    pub fn pressure_ever_good(&self) -> bool {
        self.pressure_ever_good
    }

    pub fn good_since_ms(&self) -> u32 {
        self.good_since_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::stand_mock::EventSinkMock;

    #[test]
    fn first_good_logged_once_then_regular_events() {
        let mut monitor = IgnitionMonitor::new();
        let mut log = EventSinkMock::new();
        log.set_logging_enabled(true);

        // Two full good/bad cycles.
        monitor.update(0, IG_PRESS_GOOD - 1, &mut log);
        monitor.update(1, IG_PRESS_GOOD, &mut log);
        monitor.update(2, IG_PRESS_GOOD + 50, &mut log);
        monitor.update(3, IG_PRESS_GOOD - 10, &mut log);
        monitor.update(4, IG_PRESS_GOOD + 10, &mut log);
        monitor.update(5, IG_PRESS_GOOD + 10, &mut log);

        assert_eq!(log.count_of(LogEvent::IgniterGoodFirstTime), 1);
        assert_eq!(log.count_of(LogEvent::IgniterGood), 1);
        assert_eq!(
            log.first_timestamp_of(LogEvent::IgniterGoodFirstTime),
            Some(1)
        );
        assert_eq!(log.first_timestamp_of(LogEvent::IgniterGood), Some(4));
    }

    #[test]
    fn falling_edges_log_nothing() {
        let mut monitor = IgnitionMonitor::new();
        let mut log = EventSinkMock::new();
        log.set_logging_enabled(true);

        monitor.update(0, IG_PRESS_GOOD + 100, &mut log);
        let logged = log.num_records;

        monitor.update(1, IG_PRESS_GOOD - 100, &mut log);
        monitor.update(2, IG_PRESS_GOOD - 100, &mut log);
        assert_eq!(log.num_records, logged);
        assert!(!monitor.pressure_good());
    }

    #[test]
    fn good_since_records_rising_edge_tick() {
        let mut monitor = IgnitionMonitor::new();
        let mut log = EventSinkMock::new();
        log.set_logging_enabled(true);

        monitor.update(10, IG_PRESS_GOOD - 1, &mut log);
        monitor.update(11, IG_PRESS_GOOD, &mut log);
        monitor.update(12, IG_PRESS_GOOD, &mut log);
        assert_eq!(monitor.good_since_ms(), 11);

        monitor.update(13, IG_PRESS_GOOD - 1, &mut log);
        monitor.update(14, IG_PRESS_GOOD, &mut log);
        assert_eq!(monitor.good_since_ms(), 14);
    }
}
