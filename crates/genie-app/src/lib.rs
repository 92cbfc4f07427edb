pub mod cli;
pub mod controller;
pub mod host;

pub use controller::GameController;
pub use host::{HostEnvironment, HostError, HostUser, ReadyState};
