use std::collections::VecDeque;

use tcpuart_common::Level;

/// Edge seen on the clock input between two propagation steps.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ClockEvent {
    None,
    RisingEdge,
    FallingEdge,
}

/// Per-instance state of a placed UART device.
///
/// `Clone` is a deep copy: a duplicate gets its own receive buffer, so
/// popping from one never affects the other.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UartData {
    rx_buffer: VecDeque<u8>,
    /// Last firm clock level; starts low.
    last_clock: bool,
}

impl UartData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify `level` against the previous firm clock level and remember
    /// it. `Unknown` never produces an edge and is not remembered, so the
    /// next firm level is compared with the last firm one.
    pub fn check_clock(&mut self, level: Level) -> ClockEvent {
        let Some(high) = level.firm() else {
            return ClockEvent::None;
        };
        let event = match (self.last_clock, high) {
            (false, true) => ClockEvent::RisingEdge,
            (true, false) => ClockEvent::FallingEdge,
            _ => ClockEvent::None,
        };
        self.last_clock = high;
        event
    }

    pub fn last_clock(&self) -> bool {
        self.last_clock
    }

    /// Bytes received from the link and not yet consumed, oldest first.
    pub fn rx_buffer(&self) -> &VecDeque<u8> {
        &self.rx_buffer
    }

    pub(crate) fn push_rx(&mut self, byte: u8) {
        self.rx_buffer.push_back(byte);
    }

    pub(crate) fn pop_rx(&mut self) -> Option<u8> {
        self.rx_buffer.pop_front()
    }

    pub fn peek_rx(&self) -> Option<u8> {
        self.rx_buffer.front().copied()
    }
}
