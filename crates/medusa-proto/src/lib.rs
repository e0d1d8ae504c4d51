//! Shared types for talking to a Medusa head: API wire format, page routes,
//! clock formatting and the remote's configuration file.

pub mod clock;
pub mod config;
pub mod platform;
pub mod protocol;
pub mod route;
