use std::io::{ErrorKind, Read, Write};
use std::net::{IpAddr, Ipv4Addr, TcpListener, TcpStream};
use std::time::{Duration, Instant};

use tcpuart::{RunConfig, Runner};

fn loopback_config(port: u16) -> RunConfig {
    RunConfig::builder()
        .port(port)
        .bind_ip(IpAddr::V4(Ipv4Addr::LOCALHOST))
        .half_period(Duration::ZERO)
        .build()
}

#[test]
fn echoes_what_the_client_sends() {
    let mut runner = Runner::new(&loopback_config(0)).unwrap();
    let mut client = TcpStream::connect(runner.local_addr().unwrap()).unwrap();
    client.set_nonblocking(true).unwrap();
    client.write_all(b"hello\x00\xff").unwrap();

    let mut echoed = Vec::new();
    let start = Instant::now();
    while echoed.len() < 7 {
        assert!(start.elapsed() < Duration::from_secs(5), "got {echoed:?}");
        runner.cycle().unwrap();
        let mut buf = [0u8; 16];
        match client.read(&mut buf) {
            Ok(n) => echoed.extend_from_slice(&buf[..n]),
            Err(e) if e.kind() == ErrorKind::WouldBlock => {}
            Err(e) => panic!("client read failed: {e}"),
        }
    }

    assert_eq!(echoed, b"hello\x00\xff");
    assert_eq!(runner.echo().echoed(), 7);
}

#[test]
fn busy_port_is_reported() {
    let blocker = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let port = blocker.local_addr().unwrap().port();

    let err = Runner::new(&loopback_config(port)).err().expect("bind should fail");
    assert!(err.to_string().contains("port is in use"), "{err}");
}

#[test]
fn run_stops_after_max_cycles() {
    let config = RunConfig::builder()
        .port(0)
        .bind_ip(IpAddr::V4(Ipv4Addr::LOCALHOST))
        .half_period(Duration::ZERO)
        .max_cycles(25)
        .build();
    tcpuart::run(config).unwrap();
}
