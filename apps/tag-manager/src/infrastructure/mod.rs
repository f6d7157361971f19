// Infrastructure layer module
// Runs the game loop and publishes its state to the adapters

pub mod driver;

pub use driver::{DriverHandle, GameClock, GameDriver, Inbound};
