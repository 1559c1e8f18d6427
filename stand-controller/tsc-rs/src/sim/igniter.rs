use shared::stand_hal::{IgniterSimConfig, IG_PRESSURE_TARGET, NO_PRESSURE};

const SIM_IG_INTERVAL_MS: u32 = 1;

pub struct IgniterInputs {
    pub ipa_valve_open: bool,
    pub n2o_valve_open: bool,
    pub spark_sensed: bool,
}

/// Synthesized igniter pressure: slew limited, lightly dithered, never below
/// the chamber pressure it is coupled to.
pub struct IgniterSim {
    config: IgniterSimConfig,
    output: i32,
    output_target: i32,
    /// Bounded signed counter; the emitted sample is `output + noise_phase`.
    noise_phase: i32,
    /// 0 = not counting; otherwise the tick at which sustained ignition
    /// conditions take effect.
    dwell_deadline_ms: u32,
    next_due_ms: u32,
}

impl IgniterSim {
    pub fn new(config: &IgniterSimConfig) -> Self {
        Self {
            config: *config,
            output: NO_PRESSURE,
            output_target: NO_PRESSURE,
            noise_phase: 0,
            dwell_deadline_ms: 0,
            next_due_ms: 0,
        }
    }

    /// Returns the sample to drive onto the simulated sensor, or `None` when
    /// the 1 ms cadence is not yet due.
    pub fn update(
        &mut self,
        now_ms: u32,
        inputs: IgniterInputs,
        chamber_pressure: i32,
    ) -> Option<i32> {
        // The dither advances on every call, even between due ticks.
        self.noise_phase += 1;
        if self.noise_phase > self.config.noise_amplitude {
            self.noise_phase = -self.config.noise_amplitude;
        }

        if now_ms < self.next_due_ms {
            return None;
        }
        self.next_due_ms = now_ms + SIM_IG_INTERVAL_MS;

        self.slew_output();
        let sample = self.output + self.noise_phase;

        self.update_target(now_ms, &inputs, chamber_pressure);

        Some(sample)
    }

    fn slew_output(&mut self) {
        if self.output < self.output_target {
            self.output += self.config.slew_increment;
            if self.output >= self.output_target {
                self.output = self.output_target;
            }
        }
        if self.output > self.output_target {
            self.output -= self.config.slew_increment;
            if self.output <= self.output_target {
                self.output = self.output_target;
            }
        }
    }

    fn update_target(&mut self, now_ms: u32, inputs: &IgniterInputs, chamber_pressure: i32) {
        let both_valves_open = inputs.ipa_valve_open && inputs.n2o_valve_open;

        // Either valve closed kills the igniter pressure.
        if !both_valves_open {
            self.output_target = NO_PRESSURE;
        }

        // Light once ignition conditions have held for the dwell delay. A hot
        // chamber substitutes for the spark (relight from the chamber).
        let ignition_source = inputs.spark_sensed
            || chamber_pressure > NO_PRESSURE + self.config.relight_margin;

        if both_valves_open && ignition_source && self.config.lights {
            if self.dwell_deadline_ms == 0 {
                self.dwell_deadline_ms = now_ms + self.config.light_delay_ms;
            } else if now_ms >= self.dwell_deadline_ms {
                self.dwell_deadline_ms = 0;
                self.output_target = IG_PRESSURE_TARGET;
            }
        }

        // Conditions broken: stop counting, and drop out unless the igniter
        // stays lit on its own.
        if !both_valves_open || !inputs.spark_sensed {
            self.dwell_deadline_ms = 0;
            if !self.config.stays_lit {
                self.output_target = NO_PRESSURE;
            }
        }

        // Coupling floor: the igniter sits downstream of the chamber and can
        // never read less pressure than the chamber produces.
        if self.output_target < chamber_pressure {
            self.output_target = chamber_pressure;
        }
    }

    pub fn output(&self) -> i32 {
        self.output
    }

    pub fn output_target(&self) -> i32 {
        self.output_target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_on() -> IgniterInputs {
        IgniterInputs {
            ipa_valve_open: true,
            n2o_valve_open: true,
            spark_sensed: true,
        }
    }

    fn all_off() -> IgniterInputs {
        IgniterInputs {
            ipa_valve_open: false,
            n2o_valve_open: false,
            spark_sensed: false,
        }
    }

    #[test]
    fn target_lights_at_exact_dwell_tick() {
        let mut sim = IgniterSim::new(&IgniterSimConfig::default());

        for t in 0..25 {
            sim.update(t, all_on(), NO_PRESSURE);
            assert_eq!(sim.output_target(), NO_PRESSURE, "lit early at t={}", t);
        }

        sim.update(25, all_on(), NO_PRESSURE);
        assert_eq!(sim.output_target(), IG_PRESSURE_TARGET);
    }

    #[test]
    fn spark_dropout_resets_dwell() {
        let mut sim = IgniterSim::new(&IgniterSimConfig::default());

        for t in 0..20 {
            sim.update(t, all_on(), NO_PRESSURE);
        }

        // Spark gone at t=20; the dwell restarts when it comes back.
        let mut no_spark = all_on();
        no_spark.spark_sensed = false;
        sim.update(20, no_spark, NO_PRESSURE);

        for t in 21..46 {
            sim.update(t, all_on(), NO_PRESSURE);
            assert_eq!(sim.output_target(), NO_PRESSURE);
        }

        sim.update(46, all_on(), NO_PRESSURE);
        assert_eq!(sim.output_target(), IG_PRESSURE_TARGET);
    }

    #[test]
    fn output_slews_and_clamps_at_target() {
        let mut sim = IgniterSim::new(&IgniterSimConfig::default());

        // Light it, then watch the output rise by the slew increment.
        for t in 0..=25 {
            sim.update(t, all_on(), NO_PRESSURE);
        }
        assert_eq!(sim.output(), NO_PRESSURE);

        sim.update(26, all_on(), NO_PRESSURE);
        assert_eq!(sim.output(), NO_PRESSURE + 150);

        for t in 27..40 {
            sim.update(t, all_on(), NO_PRESSURE);
        }
        assert_eq!(sim.output(), IG_PRESSURE_TARGET);
    }

    #[test]
    fn valve_closed_forces_baseline_target() {
        let mut sim = IgniterSim::new(&IgniterSimConfig::default());

        for t in 0..40 {
            sim.update(t, all_on(), NO_PRESSURE);
        }
        assert_eq!(sim.output_target(), IG_PRESSURE_TARGET);

        let mut ipa_closed = all_on();
        ipa_closed.ipa_valve_open = false;
        sim.update(40, ipa_closed, NO_PRESSURE);
        assert_eq!(sim.output_target(), NO_PRESSURE);
    }

    #[test]
    fn stay_lit_survives_spark_dropout() {
        let mut sim = IgniterSim::new(&IgniterSimConfig::default());

        for t in 0..40 {
            sim.update(t, all_on(), NO_PRESSURE);
        }
        assert_eq!(sim.output_target(), IG_PRESSURE_TARGET);

        let mut no_spark = all_on();
        no_spark.spark_sensed = false;
        sim.update(40, no_spark, NO_PRESSURE);
        assert_eq!(sim.output_target(), IG_PRESSURE_TARGET);
    }

    #[test]
    fn dropout_when_stay_lit_disabled() {
        let mut config = IgniterSimConfig::default();
        config.stays_lit = false;

        let mut sim = IgniterSim::new(&config);
        for t in 0..40 {
            sim.update(t, all_on(), NO_PRESSURE);
        }
        assert_eq!(sim.output_target(), IG_PRESSURE_TARGET);

        let mut no_spark = all_on();
        no_spark.spark_sensed = false;
        sim.update(40, no_spark, NO_PRESSURE);
        assert_eq!(sim.output_target(), NO_PRESSURE);
    }

    #[test]
    fn never_lights_when_light_disabled() {
        let mut config = IgniterSimConfig::default();
        config.lights = false;

        let mut sim = IgniterSim::new(&config);
        for t in 0..200 {
            sim.update(t, all_on(), NO_PRESSURE);
            assert_eq!(sim.output_target(), NO_PRESSURE);
        }
    }

    #[test]
    fn coupling_floor_tracks_chamber_pressure() {
        let mut sim = IgniterSim::new(&IgniterSimConfig::default());

        // Valves open, no spark: target would sit at baseline, but the
        // chamber pressure floors it.
        let mut no_spark = all_on();
        no_spark.spark_sensed = false;
        sim.update(0, no_spark, 500);
        assert_eq!(sim.output_target(), 500);

        let mut no_spark = all_on();
        no_spark.spark_sensed = false;
        sim.update(1, no_spark, 620);
        assert_eq!(sim.output_target(), 620);
    }

    #[test]
    fn hot_chamber_floors_target_without_spark() {
        let mut sim = IgniterSim::new(&IgniterSimConfig::default());

        // No spark, chamber above the relight margin: the dropout branch
        // keeps clearing the dwell, so the lit target never latches, but the
        // coupling floor carries the chamber pressure through.
        for t in 0..=50 {
            let mut inputs = all_on();
            inputs.spark_sensed = false;
            sim.update(t, inputs, NO_PRESSURE + 50);
        }

        assert_eq!(sim.output_target(), NO_PRESSURE + 50);
    }

    #[test]
    fn noise_phase_stays_bounded() {
        let mut sim = IgniterSim::new(&IgniterSimConfig::default());

        let mut seen_min = i32::MAX;
        let mut seen_max = i32::MIN;

        for t in 0..500 {
            if let Some(sample) = sim.update(t, all_off(), NO_PRESSURE) {
                let noise = sample - sim.output();
                seen_min = seen_min.min(noise);
                seen_max = seen_max.max(noise);
            }
        }

        assert!(seen_min >= -2);
        assert!(seen_max <= 2);
        assert_eq!(seen_min, -2);
        assert_eq!(seen_max, 2);
    }
}
