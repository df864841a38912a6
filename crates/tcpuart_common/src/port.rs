/// Pins of the UART device, in the order the host lays them out.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Port {
    /// 8-bit output: byte at the head of the receive buffer.
    Rx,
    /// 8-bit input: byte to transmit.
    Tx,
    Clk,
    /// High selects "consume received byte", low selects "transmit".
    Read,
    /// 1-bit output: a TCP client is attached.
    Connected,
    En,
    /// 1-bit output: the receive buffer is not empty.
    DataAvailable,
}

impl Port {
    pub const ALL: [Port; 7] = [
        Port::Rx,
        Port::Tx,
        Port::Clk,
        Port::Read,
        Port::Connected,
        Port::En,
        Port::DataAvailable,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn is_output(self) -> bool {
        matches!(self, Port::Rx | Port::Connected | Port::DataAvailable)
    }
}
