//! Messenger abstractions: the port the router replies through, its throttling
//! decorator, and the transport-neutral update/reply types.

pub mod port;
pub mod throttled;
pub mod types;
