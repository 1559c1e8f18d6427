use shared::{
    stand_hal::{main_pressure_raw, ChamberConfig, NO_PRESSURE},
    stand_log::{EventSink, LogEvent},
};

use super::flow::FlowLine;

/// Main-chamber pressure derived from the two flow percentages, with the
/// efficiency and cap knobs used to rehearse off-nominal starts.
pub struct ChamberSim {
    config: ChamberConfig,
    chamber_percent: i32,
    chamber_pressure: i32,
    fuel_exhausted: bool,
    last_log_ms: u32,
}

impl ChamberSim {
    pub fn new(config: &ChamberConfig) -> Self {
        Self {
            config: *config,
            chamber_percent: 0,
            chamber_pressure: NO_PRESSURE,
            fuel_exhausted: false,
            last_log_ms: 0,
        }
    }

    /// Derives the chamber percentage and pressure for this tick. Returns the
    /// new raw pressure when the percentage changed, `None` otherwise.
    pub fn update(
        &mut self,
        now_ms: u32,
        ipa: &FlowLine,
        n2o: &FlowLine,
        log: &mut dyn EventSink,
    ) -> Option<i32> {
        let percent = if ipa.exhausted() || n2o.exhausted() {
            if !self.fuel_exhausted {
                self.fuel_exhausted = true;
                log.log_event(now_ms, LogEvent::FuelGone);
            }
            0
        } else {
            let min_flow = ipa.flow_percent().min(n2o.flow_percent());
            (self.config.efficiency_pct * min_flow / 100).min(self.config.max_pct)
        };

        if percent == self.chamber_percent {
            return None;
        }
        self.chamber_percent = percent;

        // Deduplicated above; rate limited here.
        if now_ms - self.last_log_ms > self.config.log_min_interval_ms {
            log.log_event(now_ms, LogEvent::MainPercent(percent as u8));
            self.last_log_ms = now_ms;
        }

        self.chamber_pressure = main_pressure_raw(percent);
        Some(self.chamber_pressure)
    }

    pub fn chamber_percent(&self) -> i32 {
        self.chamber_percent
    }

    pub fn chamber_pressure(&self) -> i32 {
        self.chamber_pressure
    }

    pub fn fuel_exhausted(&self) -> bool {
        self.fuel_exhausted
    }
}
