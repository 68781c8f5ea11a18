//! Comms — chat gateways the relay listens on.
//!
//! One channel per process; it runs until the gateway exits or the shared
//! shutdown token is cancelled.

pub mod discord;
