pub mod console_logger;
pub mod file_logger;
pub mod maze_data;
pub mod multi_logger;
pub mod noop_logger;

pub use console_logger::*;
pub use file_logger::*;
pub use maze_data::*;
pub use multi_logger::*;
pub use noop_logger::*;
