#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]

pub mod stand_hal;
pub mod stand_log;
pub mod stand_mock;

pub use stand_log::{EventSink, FlashEventLog};

pub trait ControllerState<F, C> {
    fn update(&mut self, controller: &mut C, now_ms: u32) -> Option<F>;
    fn enter_state(&mut self, controller: &mut C, now_ms: u32);
    fn exit_state(&mut self, controller: &mut C);
}

pub trait ControllerFsm<F, C, S> {
    fn to_controller_state<'a>(&mut self) -> &mut dyn ControllerState<F, C>;
    fn hal_state(&self) -> S;
}

pub struct ControllerEntity<F, C, S> {
    fsm_state: Option<F>,
    _controller_marker: core::marker::PhantomData<C>,
    _hal_state_marker: core::marker::PhantomData<S>,
}

impl<F, C, S> ControllerEntity<F, C, S>
where
    F: ControllerFsm<F, C, S>,
{
    pub fn new(controller: &mut C, now_ms: u32, fsm_state: F) -> Self {
        let mut controller_fsm = Self {
            fsm_state: None,
            _controller_marker: core::marker::PhantomData,
            _hal_state_marker: core::marker::PhantomData,
        };

        controller_fsm.transition_state(controller, now_ms, None, fsm_state);

        controller_fsm
    }

    pub fn update(&mut self, controller: &mut C, now_ms: u32) {
        if let Some(mut current_state) = self.fsm_state.take() {
            let new_state = current_state
                .to_controller_state()
                .update(controller, now_ms);

            if let Some(new_state) = new_state {
                self.transition_state(controller, now_ms, Some(current_state), new_state);
            } else {
                self.fsm_state = Some(current_state);
            }
        }
    }

    fn transition_state(
        &mut self,
        controller: &mut C,
        now_ms: u32,
        old_state: Option<F>,
        mut new_state: F,
    ) {
        if let Some(mut old_state) = old_state {
            old_state.to_controller_state().exit_state(controller);
        }

        new_state.to_controller_state().enter_state(controller, now_ms);

        self.fsm_state = Some(new_state);
    }

    pub fn hal_state(&self) -> S {
        self.fsm_state
            .as_ref()
            .expect("No FSM state, impl must be wrong")
            .hal_state()
    }
}
