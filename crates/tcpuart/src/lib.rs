use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Result};
use typed_builder::TypedBuilder;

use tcpuart_common::{Level, Port};
use tcpuart_device::{SimInstance, UartComponent};
use tcpuart_link::{LinkConfig, LinkRegistry, SocketLink, Status, DEFAULT_PORT};

#[derive(TypedBuilder, Clone, Debug)]
pub struct RunConfig {
    #[builder(default = DEFAULT_PORT)]
    pub port: u16,
    /// Time the clock stays at each level.
    #[builder(default = Duration::from_millis(1))]
    pub half_period: Duration,
    #[builder(default = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind_ip: IpAddr,
    /// Stop after this many clock cycles; run forever when unset.
    #[builder(default, setter(strip_option))]
    pub max_cycles: Option<u64>,
}

/// Logic wired to the device's inputs: every received byte is consumed and
/// sent straight back on the following cycle.
#[derive(Default)]
pub struct Echo {
    pending: Option<u8>,
    echoed: u64,
}

impl Echo {
    /// Set up the inputs for the coming falling edge from the settled
    /// outputs.
    pub fn drive(&mut self, sim: &mut SimInstance) {
        if let Some(byte) = self.pending.take() {
            sim.set_input(Port::En, Level::High);
            sim.set_input(Port::Read, Level::Low);
            sim.set_tx(Some(byte));
            self.echoed += 1;
        } else if sim.output(Port::DataAvailable) == Level::High {
            self.pending = sim.rx();
            sim.set_input(Port::En, Level::High);
            sim.set_input(Port::Read, Level::High);
        } else {
            sim.set_input(Port::En, Level::Low);
        }
    }

    /// Bytes written back so far.
    pub fn echoed(&self) -> u64 {
        self.echoed
    }
}

/// A single UART instance on a free-running clock.
pub struct Runner {
    uart: UartComponent,
    sim: SimInstance,
    link: Arc<SocketLink>,
    echo: Echo,
    half_period: Duration,
    cycles: u64,
    last_status: Status,
}

impl Runner {
    /// Place the device and bind its port. Fails if the port cannot be
    /// served.
    pub fn new(config: &RunConfig) -> Result<Self> {
        let links = LinkRegistry::new(LinkConfig::builder().bind_ip(config.bind_ip).build());
        let uart = UartComponent::new(Arc::new(links));
        let mut sim = SimInstance::new(uart.default_port());
        sim.set_tcp_port(&uart, config.port);
        sim.step(&uart);

        let link = uart
            .links()
            .get(config.port)
            .ok_or_else(|| anyhow!("no link for port {}", config.port))?;
        let status = link.status();
        if status.is_terminal() {
            return Err(anyhow!(
                "port {}: {} ({})",
                config.port,
                status,
                link.last_error().unwrap_or("no details")
            ));
        }

        Ok(Self {
            uart,
            sim,
            link,
            echo: Echo::default(),
            half_period: config.half_period,
            cycles: 0,
            last_status: status,
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.link.local_addr()
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn echo(&self) -> &Echo {
        &self.echo
    }

    /// One clock cycle: rising edge, input update, falling edge.
    pub fn cycle(&mut self) -> Result<()> {
        self.sim.clock(&self.uart, Level::High);
        self.echo.drive(&mut self.sim);
        self.pause();
        self.sim.clock(&self.uart, Level::Low);
        self.pause();
        self.cycles += 1;

        let status = self.link.status();
        if status != self.last_status {
            let labels = self.uart.labels(self.sim.data(), self.link.port());
            log::info!("{} | {}", labels.status, labels.rx);
            self.last_status = status;
        }
        if status.is_terminal() {
            return Err(anyhow!(
                "link stopped: {}",
                self.link.last_error().unwrap_or(status.label())
            ));
        }
        Ok(())
    }

    fn pause(&self) {
        if !self.half_period.is_zero() {
            thread::sleep(self.half_period);
        }
    }
}

pub fn run(config: RunConfig) -> Result<()> {
    let mut runner = Runner::new(&config)?;
    match runner.local_addr() {
        Some(addr) => log::info!("UART listening on {addr}, echoing received bytes"),
        None => log::info!("UART on port {}, echoing received bytes", config.port),
    }

    while config.max_cycles.map_or(true, |max| runner.cycles() < max) {
        runner.cycle()?;
    }

    log::info!(
        "Stopped after {} cycles, echoed {} bytes",
        runner.cycles(),
        runner.echo().echoed()
    );
    Ok(())
}
