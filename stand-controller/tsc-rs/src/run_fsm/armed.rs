use shared::{
    stand_hal::{LedMode, PressureChannel, PropellantLine, NO_PRESSURE},
    ControllerState,
};

use crate::StandController;

use super::{idle::Idle, running::Running, RunFsm};

pub struct Armed;

impl<'f> ControllerState<RunFsm, StandController<'f>> for Armed {
    fn update(&mut self, controller: &mut StandController, _now_ms: u32) -> Option<RunFsm> {
        if controller.driver.abort_requested() {
            controller.do_exit();
            return Some(Idle::new());
        }

        // First sign of valve or spark activity starts the run.
        let activity = controller.driver.valve_open(PropellantLine::Ipa)
            || controller.driver.valve_open(PropellantLine::N2o)
            || controller.driver.spark_sensed();

        if activity {
            return Some(Running::new(&controller.config));
        }

        None
    }

    fn enter_state(&mut self, controller: &mut StandController, _now_ms: u32) {
        controller.log.reset();
        controller.log.set_logging_enabled(true);

        controller.igniter_is_simulated = !controller.driver.igniter_sensor_present();
        controller.chamber_pressure = NO_PRESSURE;

        controller.driver.set_led(LedMode::On);
        controller
            .driver
            .set_simulated_pressure(PressureChannel::MainChamber, NO_PRESSURE);
        if controller.igniter_is_simulated {
            controller
                .driver
                .set_simulated_pressure(PressureChannel::Igniter, NO_PRESSURE);
        }
    }

    fn exit_state(&mut self, _controller: &mut StandController) {
        // Nothing
    }
}

impl Armed {
    pub fn new() -> RunFsm {
        RunFsm::Armed(Self {})
    }
}
