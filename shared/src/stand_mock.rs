use core::any::Any;

use crate::stand_hal::{LedMode, PressureChannel, PropellantLine, StandDriver, NO_PRESSURE};
use crate::stand_log::{EventRecord, EventSink, LogEvent};
use strum::EnumCount;

pub struct StandDriverMock {
    pub now_ms: u32,
    pub abort: bool,
    pub spark: bool,
    pub sensor_present: bool,
    pub real_igniter_pressure: i32,
    pub valves: [bool; PropellantLine::COUNT],
    pub servo_cmd_deg: [i32; PropellantLine::COUNT],
    pub sim_pressure: [i32; PressureChannel::COUNT],
    pub led: LedMode,
}

impl StandDriver for StandDriverMock {
    fn timestamp_ms(&self) -> u32 {
        self.now_ms
    }

    fn abort_requested(&self) -> bool {
        self.abort
    }

    fn clear_abort(&mut self) {
        self.abort = false;
    }

    fn valve_open(&self, line: PropellantLine) -> bool {
        self.valves[line.index()]
    }

    fn spark_sensed(&self) -> bool {
        self.spark
    }

    fn commanded_servo_deg(&self, line: PropellantLine) -> i32 {
        self.servo_cmd_deg[line.index()]
    }

    fn igniter_pressure(&self) -> i32 {
        // Without a physical sensor the measured channel reads back the
        // simulated output, same as the stand wiring.
        if self.sensor_present {
            self.real_igniter_pressure
        } else {
            self.sim_pressure[PressureChannel::Igniter.index()]
        }
    }

    fn igniter_sensor_present(&self) -> bool {
        self.sensor_present
    }

    fn set_simulated_pressure(&mut self, channel: PressureChannel, raw: i32) {
        self.sim_pressure[channel.index()] = raw;
    }

    fn set_led(&mut self, mode: LedMode) {
        self.led = mode;
    }

    fn as_mut_any(&mut self) -> &mut dyn Any {
        self
    }
}

impl StandDriverMock {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            abort: false,
            spark: false,
            sensor_present: false,
            real_igniter_pressure: NO_PRESSURE,
            valves: [false; PropellantLine::COUNT],
            servo_cmd_deg: [0; PropellantLine::COUNT],
            sim_pressure: [0; PressureChannel::COUNT],
            led: LedMode::Off,
        }
    }

    pub fn simulated_pressure(&self, channel: PressureChannel) -> i32 {
        self.sim_pressure[channel.index()]
    }
}

pub const EVENT_SINK_MOCK_CAPACITY: usize = 256;

pub struct EventSinkMock {
    pub records: [Option<EventRecord>; EVENT_SINK_MOCK_CAPACITY],
    pub num_records: usize,
    pub enabled: bool,
    pub commits: u32,
    pub resets: u32,
}

impl EventSink for EventSinkMock {
    fn log_event(&mut self, timestamp_ms: u32, event: LogEvent) {
        if !self.enabled {
            return;
        }

        if self.num_records < EVENT_SINK_MOCK_CAPACITY {
            self.records[self.num_records] = Some(EventRecord {
                timestamp_ms,
                event,
            });
            self.num_records += 1;
        }
    }

    fn commit(&mut self) {
        self.commits += 1;
    }

    fn set_logging_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn reset(&mut self) {
        self.records = [None; EVENT_SINK_MOCK_CAPACITY];
        self.num_records = 0;
        self.resets += 1;
    }
}

impl EventSinkMock {
    pub fn new() -> Self {
        Self {
            records: [None; EVENT_SINK_MOCK_CAPACITY],
            num_records: 0,
            enabled: false,
            commits: 0,
            resets: 0,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        self.records[0..self.num_records].iter().flatten()
    }

    pub fn count_of(&self, event: LogEvent) -> usize {
        self.iter().filter(|record| record.event == event).count()
    }

    pub fn first_timestamp_of(&self, event: LogEvent) -> Option<u32> {
        self.iter()
            .find(|record| record.event == event)
            .map(|record| record.timestamp_ms)
    }
}
