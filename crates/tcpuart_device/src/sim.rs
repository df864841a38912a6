//! Minimal host simulator for a single UART instance.
//!
//! Inputs are set directly; outputs written by the device are scheduled and
//! only become visible once their settling delay has elapsed, which is what
//! a real schematic simulator does between propagation steps.
use tcpuart_common::{InstanceState, Level, Port};

use crate::component::UartComponent;
use crate::data::UartData;

const PORTS: usize = Port::ALL.len();

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Signal {
    Level(Level),
    Byte(u8),
}

#[derive(Debug)]
struct Scheduled {
    due: u64,
    port: Port,
    signal: Signal,
}

pub struct SimInstance {
    now: u64,
    levels: [Level; PORTS],
    bytes: [Option<u8>; PORTS],
    scheduled: Vec<Scheduled>,
    data: Option<UartData>,
    tcp_port: u16,
}

impl SimInstance {
    /// Inputs start low, outputs undefined until the first propagation
    /// settles.
    pub fn new(tcp_port: u16) -> Self {
        let mut levels = [Level::Low; PORTS];
        for port in Port::ALL.into_iter().filter(|p| p.is_output()) {
            levels[port.index()] = Level::Unknown;
        }
        Self {
            now: 0,
            levels,
            bytes: [None; PORTS],
            scheduled: Vec::new(),
            data: None,
            tcp_port,
        }
    }

    /// Simulated time, in propagation steps.
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn set_input(&mut self, port: Port, level: Level) {
        debug_assert!(!port.is_output(), "{port:?} is an output");
        self.levels[port.index()] = level;
    }

    /// Drive the TX bus; `None` leaves it undefined.
    pub fn set_tx(&mut self, value: Option<u8>) {
        self.bytes[Port::Tx.index()] = value;
    }

    /// Change the TCP port attribute, as the host's property editor would.
    pub fn set_tcp_port(&mut self, component: &UartComponent, port: u16) {
        self.tcp_port = port;
        component.instance_attribute_changed(port);
    }

    pub fn output(&self, port: Port) -> Level {
        self.levels[port.index()]
    }

    /// Settled value on the RX bus.
    pub fn rx(&self) -> Option<u8> {
        self.bytes[Port::Rx.index()]
    }

    pub fn data(&self) -> Option<&UartData> {
        self.data.as_ref()
    }

    /// Duplicate the instance state the way a host does when copying a
    /// circuit. The copy schedules nothing and owns its own buffer.
    pub fn duplicate(&self) -> Self {
        Self {
            now: self.now,
            levels: self.levels,
            bytes: self.bytes,
            scheduled: Vec::new(),
            data: self.data.clone(),
            tcp_port: self.tcp_port,
        }
    }

    /// Move time forward one step and apply every output that is now due.
    pub fn advance(&mut self) {
        self.now += 1;
        let now = self.now;
        let (due, later): (Vec<_>, Vec<_>) = std::mem::take(&mut self.scheduled)
            .into_iter()
            .partition(|s| s.due <= now);
        self.scheduled = later;
        for Scheduled { port, signal, .. } in due {
            match signal {
                Signal::Level(level) => self.levels[port.index()] = level,
                Signal::Byte(value) => self.bytes[port.index()] = Some(value),
            }
        }
    }

    /// Propagate once, then let the outputs settle.
    pub fn step(&mut self, component: &UartComponent) {
        component.propagate(self);
        self.advance();
    }

    /// Drive the clock to `level` and step.
    pub fn clock(&mut self, component: &UartComponent, level: Level) {
        self.set_input(Port::Clk, level);
        self.step(component);
    }

    /// A full low-high-low clock cycle: one rising and one falling edge.
    pub fn cycle(&mut self, component: &UartComponent) {
        self.clock(component, Level::High);
        self.clock(component, Level::Low);
    }

    fn schedule(&mut self, port: Port, signal: Signal, delay: u32) {
        debug_assert!(port.is_output(), "{port:?} is an input");
        self.scheduled.push(Scheduled {
            due: self.now + u64::from(delay),
            port,
            signal,
        });
    }
}

impl InstanceState for SimInstance {
    type Data = UartData;

    fn level(&self, port: Port) -> Level {
        self.levels[port.index()]
    }

    fn byte(&self, port: Port) -> Option<u8> {
        self.bytes[port.index()]
    }

    fn set_level(&mut self, port: Port, level: Level, delay: u32) {
        self.schedule(port, Signal::Level(level), delay);
    }

    fn set_byte(&mut self, port: Port, value: u8, delay: u32) {
        self.schedule(port, Signal::Byte(value), delay);
    }

    fn data_mut(&mut self) -> &mut Option<UartData> {
        &mut self.data
    }

    fn tcp_port(&self) -> u16 {
        self.tcp_port
    }
}
