//! Port traits: the seams between domain logic and the outside world.

pub mod clock_port;
pub mod config_port;
pub mod market_port;
pub mod pulse_port;
pub mod state_port;
