pub mod port;
pub mod state;

pub use port::Port;
pub use state::InstanceState;

/// Logic level observed on a single-bit wire.
///
/// A floating or contended wire reads as `Unknown`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Level {
    #[default]
    Low,
    High,
    Unknown,
}

impl Level {
    #[inline]
    pub const fn from_bool(high: bool) -> Level {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }

    #[inline]
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }

    /// `Some(level)` for firm levels, `None` for `Unknown`.
    #[inline]
    pub const fn firm(self) -> Option<bool> {
        match self {
            Level::Low => Some(false),
            Level::High => Some(true),
            Level::Unknown => None,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        Level::from_bool(high)
    }
}
