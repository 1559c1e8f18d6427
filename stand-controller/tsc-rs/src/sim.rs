pub mod chamber;
pub mod flow;
pub mod igniter;
