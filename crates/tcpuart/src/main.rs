use std::time::Duration;

use tcpuart::RunConfig;

const USAGE: &str = "Usage: tcpuart [port] [half_period_ms]";

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let port: u16 = match args.next() {
        Some(arg) => arg.parse().unwrap_or_else(|_| {
            eprintln!("Invalid port '{arg}'.\n{USAGE}");
            std::process::exit(2);
        }),
        None => tcpuart_link::DEFAULT_PORT,
    };
    let half_period_ms: u64 = match args.next() {
        Some(arg) => arg.parse().unwrap_or_else(|_| {
            eprintln!("Invalid half period '{arg}'.\n{USAGE}");
            std::process::exit(2);
        }),
        None => 1,
    };

    let config = RunConfig::builder()
        .port(port)
        .half_period(Duration::from_millis(half_period_ms))
        .build();

    if let Err(err) = tcpuart::run(config) {
        log::error!("{err:#}");
        eprintln!("tcpuart: {err:#}");
        std::process::exit(1);
    }
}
