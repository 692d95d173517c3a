//! Port traits: the seams between the simulator core and the outside world.

pub mod config_port;
pub mod price_source;
pub mod snapshot_port;
