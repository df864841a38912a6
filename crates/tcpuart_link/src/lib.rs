//! Network side of the TCP UART.
//!
//! A [`SocketLink`] owns one TCP listener and serves one client at a time
//! on a dedicated thread. Inbound bytes are handed to the simulation
//! through a lock-free queue; outbound bytes are written straight to the
//! client socket by the caller. A [`LinkRegistry`] keeps one link per
//! configured port so that devices sharing a port share its client.
mod error;
mod link;
mod registry;
mod status;

use std::net::{IpAddr, Ipv4Addr};

use typed_builder::TypedBuilder;

pub use error::LinkError;
pub use link::SocketLink;
pub use registry::LinkRegistry;
pub use status::Status;

/// TCP port a freshly placed device listens on.
pub const DEFAULT_PORT: u16 = 7241;

#[derive(TypedBuilder, Clone, Debug, PartialEq, Eq)]
pub struct LinkConfig {
    /// Interface the listener binds to. Defaults to all interfaces.
    #[builder(default = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind_ip: IpAddr,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
