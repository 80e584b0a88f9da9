pub mod logger;
pub mod maze;
pub mod navigation;
pub mod reconstruction;

pub use logger::*;
pub use maze::*;
pub use navigation::*;
pub use reconstruction::*;
