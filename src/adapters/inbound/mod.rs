pub mod kinematic_simulator;

pub use kinematic_simulator::*;
