use crate::{Level, Port};

/// What a host simulator hands the device on every propagation step.
///
/// The host owns the per-instance data slot and the TCP port attribute;
/// the device only reads inputs, mutates its own data, and schedules
/// outputs.
pub trait InstanceState {
    /// Per-instance data, created lazily by the device on first use.
    type Data;

    fn level(&self, port: Port) -> Level;
    /// Value of an 8-bit input bus, or `None` while any bit is not firm.
    fn byte(&self, port: Port) -> Option<u8>;

    fn set_level(&mut self, port: Port, level: Level, delay: u32);
    fn set_byte(&mut self, port: Port, value: u8, delay: u32);

    fn data_mut(&mut self) -> &mut Option<Self::Data>;

    /// The configured TCP port attribute.
    fn tcp_port(&self) -> u16;
}
