pub mod batch;
pub mod reconstruction_service;
pub mod trajectory_service;

pub use batch::*;
pub use reconstruction_service::*;
pub use trajectory_service::*;
