#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod controller;
pub mod monitor;
pub mod run_fsm;
pub mod sim;

pub use controller::StandController;
