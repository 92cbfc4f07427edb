pub mod phase;
pub mod transcript;
