//! Tick/time management for the Terminal Network.

pub mod time;

pub use time::TickCounter;
