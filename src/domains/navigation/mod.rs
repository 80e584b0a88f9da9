pub mod action;
pub mod controller;
pub mod driver;
pub mod events;
pub mod ports;
pub mod pose;
pub mod record;

pub use action::*;
pub use controller::*;
pub use driver::*;
pub use events::*;
pub use ports::*;
pub use pose::*;
pub use record::*;
