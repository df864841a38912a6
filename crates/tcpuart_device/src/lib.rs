//! Clocked side of the TCP UART.
//!
//! [`UartComponent::propagate`] is called by the host once per propagation
//! step. Received bytes move from the link into the instance's
//! [`UartData`] on a rising clock edge; on an enabled falling edge the
//! head byte is consumed (read) or the TX bus is sent (write).
mod component;
mod data;
pub mod labels;
pub mod sim;

pub use component::{UartComponent, DELAY};
pub use data::{ClockEvent, UartData};
pub use labels::Labels;
pub use sim::SimInstance;
