use shared::{
    stand_hal::{
        LedMode, PressureChannel, RunConfig, RunPhase, StandDriver, StandTelemetry, NO_PRESSURE,
    },
    stand_log::EventSink,
    ControllerEntity,
};

use crate::run_fsm::{self, RunFsm};

pub struct StandController<'a> {
    pub config: RunConfig,
    pub driver: &'a mut dyn StandDriver,
    pub log: &'a mut dyn EventSink,
    pub run: Option<ControllerEntity<RunFsm, StandController<'a>, RunPhase>>,

    /// Most recently derived main-chamber pressure, in raw counts. The
    /// igniter simulator reads this; nothing else writes it but the chamber
    /// model.
    pub chamber_pressure: i32,
    /// Latched at arming: no physical igniter sensor means we synthesize one.
    pub igniter_is_simulated: bool,

    arm_requested: bool,
}

impl<'a> StandController<'a> {
    pub fn new(driver: &'a mut dyn StandDriver, log: &'a mut dyn EventSink) -> Self {
        let now_ms = driver.timestamp_ms();

        let mut controller = Self {
            config: RunConfig::default(),
            driver,
            log,
            run: None,
            chamber_pressure: NO_PRESSURE,
            igniter_is_simulated: false,
            arm_requested: false,
        };

        controller.run = Some(ControllerEntity::new(
            &mut controller,
            now_ms,
            run_fsm::idle::Idle::new(),
        ));

        controller
    }

    /// One control-loop tick. All due work runs to completion before return.
    pub fn update(&mut self) {
        let now_ms = self.driver.timestamp_ms();

        if let Some(mut run) = self.run.take() {
            run.update(self, now_ms);
            self.run = Some(run);
        }
    }

    /// External arm request (menu selection); observed on the next tick.
    pub fn arm(&mut self) {
        self.arm_requested = true;
    }

    pub fn configure(&mut self, config: RunConfig) {
        self.config = config;
    }

    pub fn phase(&self) -> RunPhase {
        self.run
            .as_ref()
            .map(|fsm| fsm.hal_state())
            .unwrap_or(RunPhase::Idle)
    }

    pub fn generate_telemetry_frame(&self) -> StandTelemetry {
        StandTelemetry {
            timestamp_ms: self.driver.timestamp_ms(),
            phase: self.phase(),
            igniter_is_simulated: self.igniter_is_simulated,
            chamber_pressure: self.chamber_pressure,
        }
    }

    pub(crate) fn take_arm_request(&mut self) -> bool {
        let requested = self.arm_requested;
        self.arm_requested = false;
        requested
    }

    /// Common cleanup for operator abort and normal completion. Idempotent:
    /// every step is a plain overwrite or an already-gated log operation.
    pub(crate) fn do_exit(&mut self) {
        self.driver.clear_abort();
        self.driver
            .set_simulated_pressure(PressureChannel::MainChamber, NO_PRESSURE);
        if self.igniter_is_simulated {
            self.driver
                .set_simulated_pressure(PressureChannel::Igniter, NO_PRESSURE);
        }
        self.log.set_logging_enabled(false);
        self.log.commit();
        self.driver.set_led(LedMode::Off);
    }
}
