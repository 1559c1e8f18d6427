use shared::{
    stand_hal::{LedMode, PressureChannel, PropellantLine, RunConfig},
    stand_log::LogEvent,
    ControllerState,
};
use strum::{EnumCount, IntoEnumIterator};

use crate::{
    monitor::IgnitionMonitor,
    sim::{
        chamber::ChamberSim,
        flow::FlowLine,
        igniter::{IgniterInputs, IgniterSim},
    },
    StandController,
};

use super::{idle::Idle, review::Review, RunFsm};

const MAIN_SIM_INTERVAL_MS: u32 = 1;

pub struct Running {
    igniter: IgniterSim,
    lines: [FlowLine; PropellantLine::COUNT],
    chamber: ChamberSim,
    monitor: IgnitionMonitor,
    main_next_due_ms: u32,
    /// 0 until fuel exhaustion has been detected, then the scheduled
    /// finalize tick.
    end_ms: u32,
    shutdown_grace_ms: u32,
}

impl<'f> ControllerState<RunFsm, StandController<'f>> for Running {
    fn update(&mut self, controller: &mut StandController, now_ms: u32) -> Option<RunFsm> {
        if controller.driver.abort_requested() {
            controller.do_exit();
            return Some(Idle::new());
        }

        // Flow, propellant ledger and chamber derivation run on the main
        // simulation cadence. The chamber result must land before the igniter
        // target logic reads it (coupling floor).
        if now_ms >= self.main_next_due_ms {
            self.main_next_due_ms = now_ms + MAIN_SIM_INTERVAL_MS;

            for line in PropellantLine::iter() {
                let commanded_deg = controller.driver.commanded_servo_deg(line);
                self.lines[line.index()].update(now_ms, commanded_deg);
            }

            let sample = self.chamber.update(
                now_ms,
                &self.lines[PropellantLine::Ipa.index()],
                &self.lines[PropellantLine::N2o.index()],
                controller.log,
            );

            if let Some(raw) = sample {
                controller.chamber_pressure = raw;
                controller
                    .driver
                    .set_simulated_pressure(PressureChannel::MainChamber, raw);
            }
        }

        if controller.igniter_is_simulated {
            let inputs = IgniterInputs {
                ipa_valve_open: controller.driver.valve_open(PropellantLine::Ipa),
                n2o_valve_open: controller.driver.valve_open(PropellantLine::N2o),
                spark_sensed: controller.driver.spark_sensed(),
            };

            if let Some(raw) = self
                .igniter
                .update(now_ms, inputs, controller.chamber_pressure)
            {
                controller
                    .driver
                    .set_simulated_pressure(PressureChannel::Igniter, raw);
            }
        }

        self.monitor
            .update(now_ms, controller.driver.igniter_pressure(), controller.log);

        if self.chamber.fuel_exhausted() && self.end_ms == 0 {
            self.end_ms = now_ms + self.shutdown_grace_ms;
        }

        if self.chamber.fuel_exhausted() && now_ms >= self.end_ms {
            controller.log.log_event(now_ms, LogEvent::MainDone);
            controller.do_exit();
            return Some(Review::new());
        }

        None
    }

    fn enter_state(&mut self, controller: &mut StandController, now_ms: u32) {
        controller.driver.set_led(LedMode::Blinking);

        for line in self.lines.iter_mut() {
            line.start(now_ms);
        }
    }

    fn exit_state(&mut self, _controller: &mut StandController) {
        // Nothing
    }
}

impl Running {
    pub fn new(config: &RunConfig) -> RunFsm {
        RunFsm::Running(Self {
            igniter: IgniterSim::new(&config.igniter),
            lines: [
                FlowLine::new(PropellantLine::Ipa, config),
                FlowLine::new(PropellantLine::N2o, config),
            ],
            chamber: ChamberSim::new(&config.chamber),
            monitor: IgnitionMonitor::new(),
            main_next_due_ms: 0,
            end_ms: 0,
            shutdown_grace_ms: config.shutdown_grace_ms,
        })
    }
}
