//! The assembled Nova/RC3600 machine: wires `nova-cpu`'s dispatch loop to
//! `nova-devices`' concrete drivers through a small hook, adds the
//! autoload ROM tables and the real-time pacer, and exposes a background
//! [`Runner`] thread for anything driving it interactively.

mod hook;
mod machine;
mod pacer;
mod rom;
mod runner;

pub use machine::Machine;
pub use pacer::{Pacer, HALT_LOOP_ITERS, HALT_LOOP_PACE_NS};
pub use rom::UnimplementedRom;
pub use runner::Runner;
