use core::any::Any;

use serde::{Deserialize, Serialize};
use strum_macros::{EnumCount as EnumCountMacro, EnumIter};

// Raw 10-bit counts shared by the real sensors and the simulated outputs.
// Orderings matter: zero < no-pressure baseline < good threshold < lit target,
// and the main chamber tops out below full ADC scale.
pub const SENSOR_ZERO: i32 = 102;
pub const SENSOR_MAX: i32 = 922;
pub const NO_PRESSURE: i32 = 110;
pub const IG_PRESS_GOOD: i32 = 350;
pub const IG_PRESSURE_TARGET: i32 = 750;
pub const MAX_MAIN_PRESSURE: i32 = 820;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
pub enum RunPhase {
    Idle,
    Armed,
    Running,
    Review,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
pub enum LedMode {
    Off,
    On,
    Blinking,
    OneShot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumCountMacro, EnumIter, Hash)]
pub enum PropellantLine {
    Ipa,
    N2o,
}

impl PropellantLine {
    pub fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumCountMacro, EnumIter)]
pub enum PressureChannel {
    Igniter,
    MainChamber,
}

impl PressureChannel {
    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Linear raw-count scaling of a chamber percentage between the sensor zero
/// offset and the maximum main-chamber pressure.
pub fn main_pressure_raw(chamber_pct: i32) -> i32 {
    chamber_pct * (MAX_MAIN_PRESSURE - SENSOR_ZERO) / 100 + SENSOR_ZERO
}

/// Snapshot for the external display; the core only produces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandTelemetry {
    pub timestamp_ms: u32,
    pub phase: RunPhase,
    pub igniter_is_simulated: bool,
    pub chamber_pressure: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub igniter: IgniterSimConfig,
    pub servo: ServoConfig,
    pub chamber: ChamberConfig,
    pub propellant_load_units: i32,
    pub shutdown_grace_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgniterSimConfig {
    pub light_delay_ms: u32,
    pub slew_increment: i32,
    pub noise_amplitude: i32,
    pub relight_margin: i32,
    /// Failure-mode switches: does the igniter light at all, and does it stay
    /// lit once the spark drops out.
    pub lights: bool,
    pub stays_lit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServoConfig {
    /// Milliseconds per degree of servo travel.
    pub slew_inv_rate_ms: u32,
    pub ipa_min_deg: i32,
    pub ipa_max_deg: i32,
    pub n2o_min_deg: i32,
    pub n2o_max_deg: i32,
}

impl ServoConfig {
    pub fn deadband_deg(&self, line: PropellantLine) -> (i32, i32) {
        match line {
            PropellantLine::Ipa => (self.ipa_min_deg, self.ipa_max_deg),
            PropellantLine::N2o => (self.n2o_min_deg, self.n2o_max_deg),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChamberConfig {
    pub efficiency_pct: i32,
    pub max_pct: i32,
    pub log_min_interval_ms: u32,
}

impl RunConfig {
    pub fn default() -> Self {
        Self {
            igniter: IgniterSimConfig::default(),
            servo: ServoConfig::default(),
            chamber: ChamberConfig::default(),
            propellant_load_units: 4000,
            shutdown_grace_ms: 2000,
        }
    }
}

impl IgniterSimConfig {
    pub const fn default() -> Self {
        Self {
            light_delay_ms: 25,
            slew_increment: 150,
            noise_amplitude: 2,
            relight_margin: 10,
            lights: true,
            stays_lit: true,
        }
    }
}

impl ServoConfig {
    pub const fn default() -> Self {
        Self {
            slew_inv_rate_ms: 2,
            ipa_min_deg: 49,
            ipa_max_deg: 49 + 80,
            n2o_min_deg: 49,
            n2o_max_deg: 49 + 80,
        }
    }
}

impl ChamberConfig {
    pub const fn default() -> Self {
        Self {
            efficiency_pct: 100,
            max_pct: 100,
            log_min_interval_ms: 12,
        }
    }
}

pub trait StandDriver {
    /// Monotonically non-decreasing millisecond counter.
    fn timestamp_ms(&self) -> u32;

    /// Latched operator abort; cleared by the core once handled.
    fn abort_requested(&self) -> bool;
    fn clear_abort(&mut self);

    fn valve_open(&self, line: PropellantLine) -> bool;
    fn spark_sensed(&self) -> bool;
    fn commanded_servo_deg(&self, line: PropellantLine) -> i32;

    /// Measured igniter pressure in raw counts. When no physical sensor is
    /// present the hardware loops the simulated output back onto this
    /// channel, and implementations must do the same.
    fn igniter_pressure(&self) -> i32;
    fn igniter_sensor_present(&self) -> bool;

    fn set_simulated_pressure(&mut self, channel: PressureChannel, raw: i32);
    fn set_led(&mut self, mode: LedMode);

    fn as_mut_any(&mut self) -> &mut dyn Any;
}
