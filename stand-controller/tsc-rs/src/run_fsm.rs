use shared::{stand_hal::RunPhase, ControllerFsm, ControllerState};

use crate::StandController;

pub mod armed;
pub mod idle;
pub mod review;
pub mod running;

pub enum RunFsm {
    Idle(idle::Idle),
    Armed(armed::Armed),
    Running(running::Running),
    Review(review::Review),
}

impl<'a> ControllerFsm<RunFsm, StandController<'a>, RunPhase> for RunFsm {
    fn to_controller_state(&mut self) -> &mut dyn ControllerState<RunFsm, StandController<'a>> {
        match self {
            RunFsm::Idle(state) => state,
            RunFsm::Armed(state) => state,
            RunFsm::Running(state) => state,
            RunFsm::Review(state) => state,
        }
    }

    fn hal_state(&self) -> RunPhase {
        match self {
            RunFsm::Idle(_) => RunPhase::Idle,
            RunFsm::Armed(_) => RunPhase::Armed,
            RunFsm::Running(_) => RunPhase::Running,
            RunFsm::Review(_) => RunPhase::Review,
        }
    }
}
