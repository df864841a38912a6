use tcpuart_link::{SocketLink, Status};

use crate::data::UartData;

/// Longest RX dump drawn inside the device body.
pub const MAX_RX_LEN: usize = 20;
/// Longest status line drawn inside the device body.
pub const MAX_STATUS_LEN: usize = 22;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Labels {
    pub rx: String,
    pub status: String,
}

/// `"RX: "` followed by a hex dump of the pending bytes.
pub fn rx_line(data: Option<&UartData>) -> String {
    let mut line = String::from("RX: ");
    if let Some(data) = data {
        for byte in data.rx_buffer() {
            line.push_str(&format!(" {byte:02x}"));
        }
    }
    limit_length(&mut line, MAX_RX_LEN);
    line
}

/// `"Status: "` and the link state; a port nobody has bound yet is down.
pub fn status_line(link: Option<&SocketLink>) -> String {
    let label = link.map_or(Status::Down.label(), SocketLink::status_label);
    let mut line = format!("Status: {label}");
    limit_length(&mut line, MAX_STATUS_LEN);
    line
}

/// Cut `line` to `max` characters, ending in `...` when anything was cut.
pub fn limit_length(line: &mut String, max: usize) {
    if line.chars().count() <= max {
        return;
    }
    let keep = max.saturating_sub(3);
    let cut = line.char_indices().nth(keep).map_or(line.len(), |(i, _)| i);
    line.truncate(cut);
    line.push_str("...");
}
