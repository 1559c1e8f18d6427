use shared::stand_hal::{PropellantLine, RunConfig};

/// One propellant line: slewed servo angle, derived flow percentage, and the
/// consumption ledger for that propellant.
pub struct FlowLine {
    deadband_min_deg: i32,
    deadband_max_deg: i32,
    slew_inv_rate_ms: u32,
    servo_position_deg: i32,
    last_slew_ms: u32,
    flow_percent: i32,
    fractional_consumed: i32,
    level_remaining: i32,
}

impl FlowLine {
    pub fn new(line: PropellantLine, config: &RunConfig) -> Self {
        let (deadband_min_deg, deadband_max_deg) = config.servo.deadband_deg(line);

        Self {
            deadband_min_deg,
            deadband_max_deg,
            slew_inv_rate_ms: config.servo.slew_inv_rate_ms,
            servo_position_deg: 0,
            last_slew_ms: 0,
            flow_percent: 0,
            fractional_consumed: 0,
            level_remaining: config.propellant_load_units,
        }
    }

    pub fn start(&mut self, now_ms: u32) {
        self.last_slew_ms = now_ms;
    }

    /// One ledger step: slew the servo, derive the flow percentage, integrate
    /// consumption. Call at most once per millisecond.
    pub fn update(&mut self, now_ms: u32, commanded_deg: i32) {
        self.slew_servo(now_ms, commanded_deg);

        self.flow_percent = if self.servo_position_deg <= self.deadband_min_deg {
            0
        } else if self.servo_position_deg >= self.deadband_max_deg {
            100
        } else {
            100 * (self.servo_position_deg - self.deadband_min_deg)
                / (self.deadband_max_deg - self.deadband_min_deg)
        };

        self.fractional_consumed += self.flow_percent;
        self.level_remaining -= self.fractional_consumed / 100;
        self.fractional_consumed %= 100;
    }

    fn slew_servo(&mut self, now_ms: u32, commanded_deg: i32) {
        // Whole steps only; leftover milliseconds stay banked so the angular
        // rate never drifts from real elapsed time.
        let steps = ((now_ms - self.last_slew_ms) / self.slew_inv_rate_ms) as i32;
        self.last_slew_ms += steps as u32 * self.slew_inv_rate_ms;

        if commanded_deg <= 0 || commanded_deg == self.servo_position_deg {
            return;
        }

        if commanded_deg > self.servo_position_deg {
            self.servo_position_deg += steps;
            if self.servo_position_deg > commanded_deg {
                self.servo_position_deg = commanded_deg;
            }
        } else {
            self.servo_position_deg -= steps;
            if self.servo_position_deg < commanded_deg {
                self.servo_position_deg = commanded_deg;
            }
        }
    }

    pub fn servo_position_deg(&self) -> i32 {
        self.servo_position_deg
    }

    pub fn flow_percent(&self) -> i32 {
        self.flow_percent
    }

    pub fn level_remaining(&self) -> i32 {
        self.level_remaining
    }

    pub fn exhausted(&self) -> bool {
        self.level_remaining < 0
    }
}
