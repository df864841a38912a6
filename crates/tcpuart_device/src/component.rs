use std::sync::Arc;

use log::{debug, trace, warn};
use tcpuart_common::{InstanceState, Level, Port};
use tcpuart_link::{LinkError, LinkRegistry, SocketLink, DEFAULT_PORT};

use crate::data::{ClockEvent, UartData};
use crate::labels::{self, Labels};

/// Settling delay, in host propagation steps, applied to every output.
pub const DELAY: u32 = 1;

/// The UART device factory.
///
/// One component serves every placed instance; instances pick their
/// [`SocketLink`] through the shared registry by their TCP port attribute.
pub struct UartComponent {
    links: Arc<LinkRegistry>,
}

impl UartComponent {
    pub fn new(links: Arc<LinkRegistry>) -> Self {
        Self { links }
    }

    pub fn links(&self) -> &Arc<LinkRegistry> {
        &self.links
    }

    /// Port attribute value of a freshly placed instance.
    pub fn default_port(&self) -> u16 {
        DEFAULT_PORT
    }

    /// Called by the host when an instance's TCP port attribute changes.
    /// The link for the old port stays up; other instances may use it.
    pub fn instance_attribute_changed(&self, port: u16) -> Arc<SocketLink> {
        self.links.link(port)
    }

    /// One propagation step.
    ///
    /// Buffer contents only change on clock edges; the outputs are
    /// recomputed from the current buffer and link state every time.
    pub fn propagate<S>(&self, state: &mut S)
    where
        S: InstanceState<Data = UartData>,
    {
        let link = self.links.link(state.tcp_port());

        let clk = state.level(Port::Clk);
        let en = state.level(Port::En);
        let read = state.level(Port::Read);
        let tx = state.byte(Port::Tx);

        let data = state.data_mut().get_or_insert_with(UartData::new);

        match data.check_clock(clk) {
            ClockEvent::RisingEdge => {
                if link.is_connected() {
                    receive(data, &link);
                }
            }
            ClockEvent::FallingEdge if en.is_high() => match read {
                Level::High => {
                    data.pop_rx();
                }
                Level::Low => transmit(&link, tx),
                Level::Unknown => debug!("UART: read/write select undefined, ignoring edge"),
            },
            _ => {}
        }

        let head = data.peek_rx();
        let connected = link.is_connected();

        state.set_byte(Port::Rx, head.unwrap_or(0), DELAY);
        state.set_level(Port::DataAvailable, Level::from(head.is_some()), DELAY);
        state.set_level(Port::Connected, Level::from(connected), DELAY);
    }

    /// Text the host draws inside the instance body. Only looks links up,
    /// so drawing never binds a port.
    pub fn labels(&self, data: Option<&UartData>, port: u16) -> Labels {
        let link = self.links.get(port);
        Labels {
            rx: labels::rx_line(data),
            status: labels::status_line(link.as_deref()),
        }
    }
}

/// Move everything the link has queued into the receive buffer.
fn receive(data: &mut UartData, link: &SocketLink) {
    let mut count = 0usize;
    while let Some(byte) = link.try_read_byte() {
        data.push_rx(byte);
        count += 1;
    }
    if count > 0 {
        trace!("UART: received {count} byte(s) on port {}", link.port());
    }
}

fn transmit(link: &SocketLink, tx: Option<u8>) {
    let Some(byte) = tx else {
        debug!("UART: TX bus undefined, nothing sent");
        return;
    };
    match link.write_byte(byte) {
        Ok(()) => trace!("UART: sent 0x{byte:02X} on port {}", link.port()),
        Err(LinkError::NotConnected) => {
            debug!("UART: dropped 0x{byte:02X}, no client on port {}", link.port())
        }
        Err(e) => warn!("UART: dropped 0x{byte:02X} on port {}: {e}", link.port()),
    }
}
