use shared::{stand_hal::LedMode, ControllerState};

use crate::StandController;

use super::{armed::Armed, RunFsm};

pub struct Idle;

impl<'f> ControllerState<RunFsm, StandController<'f>> for Idle {
    fn update(&mut self, controller: &mut StandController, _now_ms: u32) -> Option<RunFsm> {
        if controller.take_arm_request() {
            return Some(Armed::new());
        }

        None
    }

    fn enter_state(&mut self, controller: &mut StandController, _now_ms: u32) {
        controller.driver.set_led(LedMode::Off);
    }

    fn exit_state(&mut self, _controller: &mut StandController) {
        // Nothing
    }
}

impl Idle {
    pub fn new() -> RunFsm {
        RunFsm::Idle(Self {})
    }
}
