use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Connection lifecycle of a [`SocketLink`](crate::SocketLink).
///
/// ```text
/// Down -> Waiting -> Connecting -> Connected -> Disconnecting -> Waiting ...
///   \-> BindError                                  any I/O fault -> Error
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Status {
    Down = 0,
    Waiting = 1,
    Connecting = 2,
    Connected = 3,
    Disconnecting = 4,
    BindError = 5,
    Error = 6,
}

impl Status {
    /// Short human-readable label used by status displays.
    pub const fn label(self) -> &'static str {
        match self {
            Status::Down => "down",
            Status::Waiting => "waiting",
            Status::Connecting => "connecting",
            Status::Connected => "connected",
            Status::Disconnecting => "disconnecting",
            Status::BindError => "port is in use",
            Status::Error => "error",
        }
    }

    /// A link in a terminal state never serves a client again.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Status::BindError | Status::Error)
    }

    const fn from_u8(raw: u8) -> Status {
        match raw {
            0 => Status::Down,
            1 => Status::Waiting,
            2 => Status::Connecting,
            3 => Status::Connected,
            4 => Status::Disconnecting,
            5 => Status::BindError,
            _ => Status::Error,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Status cell written by the network thread and polled by the simulation.
#[derive(Debug)]
pub(crate) struct AtomicStatus(AtomicU8);

impl AtomicStatus {
    pub(crate) fn new(status: Status) -> Self {
        Self(AtomicU8::new(status as u8))
    }

    pub(crate) fn load(&self) -> Status {
        Status::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn store(&self, status: Status) {
        self.0.store(status as u8, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::{AtomicStatus, Status};

    const ALL: [Status; 7] = [
        Status::Down,
        Status::Waiting,
        Status::Connecting,
        Status::Connected,
        Status::Disconnecting,
        Status::BindError,
        Status::Error,
    ];

    #[test]
    fn atomic_status_holds_every_state() {
        let cell = AtomicStatus::new(Status::Down);
        for status in ALL {
            cell.store(status);
            assert_eq!(cell.load(), status);
        }
    }

    #[test]
    fn only_error_states_are_terminal() {
        let terminal: Vec<_> = ALL.iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminal, [&Status::BindError, &Status::Error]);
    }

    #[test]
    fn labels_match_display() {
        assert_eq!(Status::BindError.to_string(), "port is in use");
        assert_eq!(Status::Connected.label(), "connected");
        for status in ALL {
            assert_eq!(status.to_string(), status.label());
        }
    }
}
