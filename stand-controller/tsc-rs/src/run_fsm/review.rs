use shared::ControllerState;

use crate::StandController;

use super::{idle::Idle, RunFsm};

/// The review screen itself is an external collaborator; this state only
/// waits for the operator to dismiss it.
pub struct Review;

impl<'f> ControllerState<RunFsm, StandController<'f>> for Review {
    fn update(&mut self, controller: &mut StandController, _now_ms: u32) -> Option<RunFsm> {
        if controller.driver.abort_requested() {
            controller.driver.clear_abort();
            return Some(Idle::new());
        }

        None
    }

    fn enter_state(&mut self, _controller: &mut StandController, _now_ms: u32) {
        // Nothing
    }

    fn exit_state(&mut self, _controller: &mut StandController) {
        // Nothing
    }
}

impl Review {
    pub fn new() -> RunFsm {
        RunFsm::Review(Self {})
    }
}
